//! `csv` encoder: conventional header row plus one row per record (§4.9).

use dh_domain::{CoreError, TableResult};

use crate::cell::to_display_string;

pub fn render(table: &TableResult) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(|e| CoreError::internal(format!("csv header write failed: {e}")))?;
    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(to_display_string).collect();
        writer
            .write_record(&fields)
            .map_err(|e| CoreError::internal(format!("csv row write failed: {e}")))?;
    }
    let bytes = writer.into_inner().map_err(|e| CoreError::internal(format!("csv flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::internal(format!("csv output was not valid utf-8: {e}")))
}

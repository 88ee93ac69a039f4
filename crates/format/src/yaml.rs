//! `yaml` encoder: the same row-of-objects shape as `json-row`, re-encoded
//! through `serde_yaml` (§4.9).

use dh_domain::{CoreError, TableResult};
use serde_json::{Map, Value};

use crate::cell::to_json;

pub fn render(table: &TableResult) -> Result<String, CoreError> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut obj = Map::new();
            for (col, cell) in table.columns.iter().zip(row) {
                obj.insert(col.name.clone(), to_json(cell));
            }
            Value::Object(obj)
        })
        .collect();
    serde_yaml::to_string(&rows).map_err(|e| CoreError::internal(format!("yaml serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_domain::{CellValue, ColumnDef};

    #[test]
    fn renders_one_mapping_per_row() {
        let table = TableResult {
            columns: vec![ColumnDef { name: "id".into(), type_name: "int".into() }],
            rows: vec![vec![CellValue::Int(1)]],
            is_complete: true,
        };
        let yaml = render(&table).unwrap();
        assert!(yaml.contains("id: 1"));
    }
}

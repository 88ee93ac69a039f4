//! `json-row` and `json-column` encoders (§4.9).

use dh_domain::TableResult;
use serde_json::{Map, Value};

use crate::cell::to_json;

/// List of objects, column-name → value.
pub fn render_row(table: &TableResult) -> String {
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
    serde_json::to_string(&rows).expect("json array serialization cannot fail")
}

/// Object of column-name → list of values.
pub fn render_column(table: &TableResult) -> String {
    let mut obj = Map::new();
    for (i, col) in table.columns.iter().enumerate() {
        let values: Vec<Value> = table.rows.iter().map(|row| to_json(&row[i])).collect();
        obj.insert(col.name.clone(), Value::Array(values));
    }
    serde_json::to_string(&Value::Object(obj)).expect("json object serialization cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_domain::{CellValue, ColumnDef};

    fn sample() -> TableResult {
        TableResult {
            columns: vec![ColumnDef { name: "id".into(), type_name: "int".into() }, ColumnDef { name: "name".into(), type_name: "str".into() }],
            rows: vec![vec![CellValue::Int(1), CellValue::Str("a".into())], vec![CellValue::Int(2), CellValue::Str("b".into())]],
            is_complete: true,
        }
    }

    #[test]
    fn row_format_is_list_of_objects() {
        let json = render_row(&sample());
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], 1);
        assert_eq!(parsed[1]["name"], "b");
    }

    #[test]
    fn column_format_groups_by_column() {
        let json = render_column(&sample());
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["id"], serde_json::json!([1, 2]));
        assert_eq!(parsed["name"], serde_json::json!(["a", "b"]));
    }
}

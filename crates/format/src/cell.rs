//! Shared `CellValue` conversions used by every encoder.

use base64::Engine;
use dh_domain::CellValue;

fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn to_json(cell: &CellValue) -> serde_json::Value {
    match cell {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::Value::from(*i),
        CellValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        CellValue::Str(s) => serde_json::Value::String(s.clone()),
        CellValue::Bytes(b) => serde_json::Value::String(encode_bytes(b)),
    }
}

/// Plain-text rendering used by CSV, Markdown, and XML text nodes.
pub fn to_display_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => f.to_string(),
        CellValue::Str(s) => s.clone(),
        CellValue::Bytes(b) => encode_bytes(b),
    }
}

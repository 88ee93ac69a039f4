//! Structured-argument extraction helpers (§4.7 "inputs validated
//! structurally before any side effect"). Every accessor fails
//! `InvalidArgument` rather than panicking on a missing/mistyped field.

use dh_domain::CoreError;
use serde_json::Value;

fn missing(field: &str) -> CoreError {
    CoreError::invalid_argument(format!("missing required argument: {field}"))
}

fn wrong_type(field: &str, expected: &str) -> CoreError {
    CoreError::invalid_argument(format!("argument {field} must be a {expected}"))
}

pub fn str_req<'a>(args: &'a Value, field: &str) -> Result<&'a str, CoreError> {
    args.get(field).and_then(Value::as_str).ok_or_else(|| {
        if args.get(field).is_some() {
            wrong_type(field, "string")
        } else {
            missing(field)
        }
    })
}

pub fn str_opt<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str)
}

pub fn u64_opt(args: &Value, field: &str) -> Result<Option<u64>, CoreError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_u64().map(Some).ok_or_else(|| wrong_type(field, "non-negative integer")),
    }
}

pub fn i64_req(args: &Value, field: &str) -> Result<i64, CoreError> {
    args.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| if args.get(field).is_some() { wrong_type(field, "integer") } else { missing(field) })
}

pub fn i64_opt(args: &Value, field: &str) -> Result<Option<i64>, CoreError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or_else(|| wrong_type(field, "integer")),
    }
}

pub fn f64_opt(args: &Value, field: &str) -> Result<Option<f64>, CoreError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| wrong_type(field, "number")),
    }
}

pub fn bool_opt(args: &Value, field: &str) -> Result<bool, CoreError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(wrong_type(field, "boolean")),
    }
}

pub fn str_vec_opt(args: &Value, field: &str) -> Result<Vec<String>, CoreError> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| wrong_type(field, "array of strings")))
            .collect(),
        Some(_) => Err(wrong_type(field, "array of strings")),
    }
}

//! The uniform tool-call envelope every handler returns (§4.7).
//!
//! Handlers never raise through the tool boundary: success and failure are
//! both ordinary values of [`ToolEnvelope`], converted to JSON once at the
//! transport edge.

use serde_json::{Map, Value};

use crate::error::{CoreError, ErrorKind};

/// A raw tool invocation as delivered by the transport adapter.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub request_id: u64,
    pub tool_name: String,
    pub arguments: Value,
}

/// The result of a tool invocation, ready for JSON serialization.
#[derive(Debug, Clone)]
pub enum ToolEnvelope {
    Success(Map<String, Value>),
    Failure { error: String, kind: ErrorKind },
}

impl ToolEnvelope {
    pub fn ok(payload: Map<String, Value>) -> Self {
        ToolEnvelope::Success(payload)
    }

    /// Success with no payload beyond `{success: true}`.
    pub fn ok_empty() -> Self {
        ToolEnvelope::Success(Map::new())
    }

    pub fn err(e: CoreError) -> Self {
        ToolEnvelope::Failure {
            error: e.message,
            kind: e.kind,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolEnvelope::Success(_))
    }

    pub fn into_json(self) -> Value {
        match self {
            ToolEnvelope::Success(mut payload) => {
                payload.insert("success".into(), Value::Bool(true));
                Value::Object(payload)
            }
            ToolEnvelope::Failure { error, .. } => serde_json::json!({
                "success": false,
                "error": error,
                "isError": true,
            }),
        }
    }
}

impl From<CoreError> for ToolEnvelope {
    fn from(e: CoreError) -> Self {
        ToolEnvelope::err(e)
    }
}

impl From<std::result::Result<Map<String, Value>, CoreError>> for ToolEnvelope {
    fn from(r: std::result::Result<Map<String, Value>, CoreError>) -> Self {
        match r {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_includes_flag() {
        let mut payload = Map::new();
        payload.insert("row_count".into(), Value::from(5));
        let json = ToolEnvelope::ok(payload).into_json();
        assert_eq!(json["success"], Value::Bool(true));
        assert_eq!(json["row_count"], Value::from(5));
    }

    #[test]
    fn failure_envelope_shape() {
        let json = ToolEnvelope::err(CoreError::unknown_source("local")).into_json();
        assert_eq!(json["success"], Value::Bool(false));
        assert_eq!(json["isError"], Value::Bool(true));
        assert!(json["error"].as_str().unwrap().contains("local"));
    }
}

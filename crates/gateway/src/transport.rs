//! Stdio tool-protocol transport (§6): the minimal conforming adapter
//! between newline-delimited JSON and the core's [`ToolCall`]/
//! [`ToolEnvelope`] boundary. Kept isolated from the core so a richer
//! transport (SSE, streaming HTTP) could be added alongside it later
//! without touching dispatch.

use dh_domain::ToolCall;
use dh_tools::{Dispatcher, RequestContext};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Reads one JSON object per line from stdin, dispatches it, and writes one
/// JSON object per line to stdout. Runs until stdin is closed.
pub async fn serve(ctx: &RequestContext, dispatcher: &Dispatcher) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match parse_request(line) {
            Ok(call) => {
                let request_id = call.request_id;
                let mut body = dispatcher.dispatch(ctx, call).await.into_json();
                body.as_object_mut().expect("into_json always returns an object").insert("id".into(), request_id.into());
                body
            }
            Err(message) => serde_json::json!({"id": Value::Null, "success": false, "isError": true, "error": message}),
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}

fn parse_request(line: &str) -> Result<ToolCall, String> {
    let raw: Value = serde_json::from_str(line).map_err(|e| format!("malformed JSON: {e}"))?;
    let request_id = raw.get("id").and_then(Value::as_u64).ok_or("missing or non-integer \"id\" field")?;
    let tool_name = raw
        .get("tool")
        .and_then(Value::as_str)
        .ok_or("missing or non-string \"tool\" field")?
        .to_string();
    let arguments = raw.get("args").cloned().unwrap_or(Value::Null);

    Ok(ToolCall { request_id, tool_name, arguments })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_request() {
        let call = parse_request(r#"{"id": 7, "tool": "list_sessions", "args": {}}"#).unwrap();
        assert_eq!(call.request_id, 7);
        assert_eq!(call.tool_name, "list_sessions");
    }

    #[test]
    fn missing_tool_field_is_rejected() {
        let err = parse_request(r#"{"id": 1}"#).unwrap_err();
        assert!(err.contains("tool"));
    }

    #[test]
    fn missing_args_defaults_to_null() {
        let call = parse_request(r#"{"id": 1, "tool": "reload"}"#).unwrap();
        assert_eq!(call.arguments, Value::Null);
    }
}

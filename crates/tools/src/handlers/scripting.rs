//! Scripting theme: arbitrary script execution and package introspection
//! (§4.7).

use async_trait::async_trait;
use dh_domain::ToolEnvelope;
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::handlers::common::resolve_session;

pub struct SessionScriptRun;

#[async_trait]
impl ToolHandler for SessionScriptRun {
    fn name(&self) -> &'static str {
        "session_script_run"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match run(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn run(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let session_id = args::str_req(args, "session_id")?;
    let script = args::str_opt(args, "script");
    let script_path = args::str_opt(args, "script_path");
    let format = args::str_opt(args, "format").unwrap_or("auto");

    let script = match (script, script_path) {
        (Some(s), None) => s.to_string(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| dh_domain::CoreError::invalid_argument(format!("failed to read {path}: {e}")))?,
        (Some(_), Some(_)) => {
            return Err(dh_domain::CoreError::invalid_argument("exactly one of script/script_path must be set"))
        }
        (None, None) => {
            return Err(dh_domain::CoreError::invalid_argument("exactly one of script/script_path must be set"))
        }
    };

    let session = resolve_session(ctx, session_id).await?;
    let table = session.client().run_script(&script).await?;
    let rendered = dh_format::render(&table, format)?;

    let mut payload = Map::new();
    payload.insert("data".into(), Value::String(rendered.body));
    payload.insert("format".into(), Value::String(rendered.format_used.as_str().to_string()));
    payload.insert("row_count".into(), json!(rendered.row_count));
    payload.insert("is_complete".into(), Value::Bool(rendered.is_complete));
    Ok(payload)
}

pub struct SessionPipList;

#[async_trait]
impl ToolHandler for SessionPipList {
    fn name(&self) -> &'static str {
        "session_pip_list"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().pip_list().await {
            Ok(packages) => {
                let mut payload = Map::new();
                payload.insert("packages".into(), json!(packages));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_and_script_path_together_is_invalid_argument() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        let err = run(&ctx, &json!({"session_id": "community:local:local", "script": "1+1", "script_path": "/tmp/x.py"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn neither_script_nor_path_is_invalid_argument() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        let err = run(&ctx, &json!({"session_id": "community:local:local"})).await.unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn pip_list_reports_the_simulated_client_packages() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let payload = SessionPipList.call(&ctx, json!({"session_id": "community:local:local"})).await.into_json();
        assert_eq!(payload["success"], Value::Bool(true));
        assert!(payload["packages"].is_array());
    }
}

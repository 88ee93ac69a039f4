//! Discovery theme: `enterprise_systems_status`, `list_sessions`,
//! `session_details` (§4.7).

use async_trait::async_trait;
use dh_domain::{SessionKind, ToolEnvelope};
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::handlers::common::{parse_session_id, resolve_session};

pub struct EnterpriseSystemsStatus;

#[async_trait]
impl ToolHandler for EnterpriseSystemsStatus {
    fn name(&self) -> &'static str {
        "enterprise_systems_status"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let probe = match args::bool_opt(&args, "probe") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let mut systems = Vec::new();
        for key in ctx.registry.enterprise_system_keys().await {
            let Ok(manager) = ctx.registry.enterprise_system(&key).await else { continue };
            let (status, detail) = manager.status(probe).await;
            systems.push(json!({"system": key, "status": status, "detail": detail}));
        }
        let mut payload = Map::new();
        payload.insert("systems".into(), Value::Array(systems));
        ToolEnvelope::ok(payload)
    }
}

pub struct ListSessions;

#[async_trait]
impl ToolHandler for ListSessions {
    fn name(&self) -> &'static str {
        "list_sessions"
    }

    /// Cheap — does not build any manager (§4.6 `list_all`). Every returned
    /// `session_id` round-trips through `SessionId::parse` to the same
    /// `(kind, source, name)` tuple carried in the record (testable
    /// property 4).
    async fn call(&self, ctx: &RequestContext, _args: Value) -> ToolEnvelope {
        let sessions: Vec<Value> = ctx
            .registry
            .list_all()
            .await
            .into_iter()
            .map(|(id, source, name)| {
                json!({
                    "session_id": id.to_string(),
                    "kind": id.kind,
                    "source": source,
                    "name": name,
                })
            })
            .collect();
        let mut payload = Map::new();
        payload.insert("sessions".into(), Value::Array(sessions));
        ToolEnvelope::ok(payload)
    }
}

pub struct SessionDetails;

#[async_trait]
impl ToolHandler for SessionDetails {
    fn name(&self) -> &'static str {
        "session_details"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let attempt_to_connect = match args::bool_opt(&args, "attempt_to_connect") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };

        let result = details(ctx, session_id, attempt_to_connect).await;
        match result {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn details(ctx: &RequestContext, session_id: &str, attempt_to_connect: bool) -> dh_domain::Result<Map<String, Value>> {
    let id = parse_session_id(session_id)?;

    let alive = if attempt_to_connect {
        let session = resolve_session(ctx, session_id).await?;
        session.is_alive()
    } else {
        match id.kind {
            SessionKind::Community => ctx.registry.community(&id.source).await?.is_alive(),
            SessionKind::Enterprise => ctx.registry.enterprise_session(&id.source, &id.name).await?.is_alive(),
        }
    };

    let mut payload = Map::new();
    payload.insert("session_id".into(), Value::String(session_id.to_string()));
    payload.insert("kind".into(), serde_json::to_value(id.kind).unwrap_or(Value::Null));
    payload.insert("alive".into(), Value::Bool(alive));
    payload.insert(
        "supports_catalog".into(),
        Value::Bool(dh_domain::capability::supports_catalog(id.kind)),
    );
    payload.insert(
        "supports_scripts".into(),
        Value::Bool(dh_domain::capability::supports_scripts(id.kind)),
    );
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_config_lists_no_sessions() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        let envelope = ListSessions.call(&ctx, Value::Null).await.into_json();
        assert_eq!(envelope["success"], Value::Bool(true));
        assert_eq!(envelope["sessions"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_session_fails_with_readable_error() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let envelope = SessionDetails
            .call(&ctx, json!({"session_id": "community:local:missing"}))
            .await;
        match envelope {
            ToolEnvelope::Failure { error, kind } => {
                assert!(error.contains("missing"));
                assert_eq!(kind, dh_domain::ErrorKind::UnknownSession);
            }
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn session_details_round_trips_via_list_sessions() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let listed = ListSessions.call(&ctx, Value::Null).await.into_json();
        let id = listed["sessions"][0]["session_id"].as_str().unwrap().to_string();
        let parsed: dh_domain::SessionId = id.parse().unwrap();
        assert_eq!(parsed.source, "local");
        assert_eq!(parsed.name, "local");

        let details = SessionDetails.call(&ctx, json!({"session_id": id})).await.into_json();
        assert_eq!(details["success"], Value::Bool(true));
    }
}

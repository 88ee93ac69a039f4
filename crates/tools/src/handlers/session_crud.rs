//! Session CRUD theme: community session lifecycle plus the full
//! enterprise build-and-connect procedure (§4.3, §4.5, §4.7).

use std::sync::Arc;

use async_trait::async_trait;
use dh_domain::{CoreError, SessionId, SessionKind, ToolEnvelope};
use dh_resources::enterprise_session::EnterpriseSessionManager;
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::params;

pub struct SessionCommunityCreate;

#[async_trait]
impl ToolHandler for SessionCommunityCreate {
    fn name(&self) -> &'static str {
        "session_community_create"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let source = match args::str_req(&args, "source") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let manager = match ctx.registry.community(source).await {
            Ok(m) => m,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match manager.get().await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        let id = SessionId::new(SessionKind::Community, source, source);
        let mut payload = Map::new();
        payload.insert("session_id".into(), Value::String(id.to_string()));
        payload.insert("alive".into(), Value::Bool(session.is_alive()));
        ToolEnvelope::ok(payload)
    }
}

pub struct SessionCommunityDelete;

#[async_trait]
impl ToolHandler for SessionCommunityDelete {
    fn name(&self) -> &'static str {
        "session_community_delete"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let source = match args::str_req(&args, "source") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let manager = match ctx.registry.community(source).await {
            Ok(m) => m,
            Err(e) => return ToolEnvelope::err(e),
        };
        manager.close().await;
        ToolEnvelope::ok_empty()
    }
}

pub struct SessionCommunityCredentials;

#[async_trait]
impl ToolHandler for SessionCommunityCredentials {
    fn name(&self) -> &'static str {
        "session_community_credentials"
    }

    /// Reports how the credential is supplied, never its value (§3
    /// redaction invariant).
    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let source = match args::str_req(&args, "source") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let manager = match ctx.registry.community(source).await {
            Ok(m) => m,
            Err(e) => return ToolEnvelope::err(e),
        };
        let config = manager.config();
        let mut payload = Map::new();
        payload.insert("auth_type".into(), Value::String(config.auth_type.clone()));
        payload.insert("credential".into(), Value::String(config.auth_credential().redacted_display()));
        ToolEnvelope::ok(payload)
    }
}

pub struct SessionEnterpriseCreate;

#[async_trait]
impl ToolHandler for SessionEnterpriseCreate {
    fn name(&self) -> &'static str {
        "session_enterprise_create"
    }

    /// Drives the full §4.5 build procedure: resolve effective params,
    /// `add_query`, `start_and_wait`, mint the session manager, register it,
    /// then connect (step 5) before returning.
    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match create(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn create(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let session_name = args::str_req(args, "session_name")?;

    let system = ctx.registry.enterprise_system(system_key).await?;
    let defaults = &system.config().session_creation.defaults;
    let create_params = params::resolve_pq_create_params(session_name, args, defaults)?;
    let timeout_seconds = params::resolve_timeout_seconds(args, defaults)?;

    let controller = system.controller().await?;
    let descriptor = ctx.pq.start(controller.as_ref(), None, Some(create_params), timeout_seconds).await?;

    let session_mgr = Arc::new(EnterpriseSessionManager::new(session_name, descriptor.serial, controller.clone()));
    system.insert_session(session_name, session_mgr.clone());
    let session = session_mgr.get().await?;

    let id = SessionId::new(SessionKind::Enterprise, system_key, session_name);
    let mut payload = Map::new();
    payload.insert("session_id".into(), Value::String(id.to_string()));
    payload.insert("serial".into(), json!(descriptor.serial));
    payload.insert("alive".into(), Value::Bool(session.is_alive()));
    Ok(payload)
}

pub struct SessionEnterpriseDelete;

#[async_trait]
impl ToolHandler for SessionEnterpriseDelete {
    fn name(&self) -> &'static str {
        "session_enterprise_delete"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match delete(ctx, &args).await {
            Ok(()) => ToolEnvelope::ok_empty(),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn delete(ctx: &RequestContext, args: &Value) -> dh_domain::Result<()> {
    let system_key = args::str_req(args, "system_name")?;
    let session_name = args::str_req(args, "session_name")?;

    let system = ctx.registry.enterprise_system(system_key).await?;
    let session_mgr = system
        .enterprise_session(session_name)
        .ok_or_else(|| CoreError::unknown_session(system_key, session_name))?;

    session_mgr.close().await;
    system.remove_session(session_name);

    let controller = system.controller().await?;
    controller.delete_query(session_mgr.pq_serial()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn community_create_then_delete_round_trips() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;

        let created = SessionCommunityCreate.call(&ctx, json!({"source": "local"})).await.into_json();
        assert_eq!(created["success"], Value::Bool(true));
        assert_eq!(created["session_id"], Value::String("community:local:local".into()));

        let deleted = SessionCommunityDelete.call(&ctx, json!({"source": "local"})).await;
        assert!(deleted.is_success());
        assert!(!ctx.registry.community("local").await.unwrap().is_alive());
    }

    #[tokio::test]
    async fn community_credentials_never_leak_the_inline_token() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "token", "auth_token": "super-secret", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let reported = SessionCommunityCredentials.call(&ctx, json!({"source": "local"})).await.into_json();
        let rendered = serde_json::to_string(&reported).unwrap();
        assert!(!rendered.contains("super-secret"));
        assert_eq!(reported["auth_type"], Value::String("token".into()));
    }

    #[tokio::test]
    async fn unknown_community_source_fails_unknown_source() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        let envelope = SessionCommunityCreate.call(&ctx, json!({"source": "missing"})).await;
        match envelope {
            ToolEnvelope::Failure { kind, .. } => assert_eq!(kind, dh_domain::ErrorKind::UnknownSource),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn enterprise_create_then_delete_round_trips() {
        let raw = r#"{"enterprise": {"systems": {"prod": {"connection_json_url": "https://ctrl.example", "auth_type": "password", "username": "u", "password": "p"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;

        let created = SessionEnterpriseCreate
            .call(&ctx, json!({"system_name": "prod", "session_name": "w1", "heap_size_gb": 4.0, "programming_language": "python"}))
            .await
            .into_json();
        assert_eq!(created["success"], Value::Bool(true));
        assert_eq!(created["session_id"], Value::String("enterprise:prod:w1".into()));

        let deleted = SessionEnterpriseDelete.call(&ctx, json!({"system_name": "prod", "session_name": "w1"})).await;
        assert!(deleted.is_success());
    }
}

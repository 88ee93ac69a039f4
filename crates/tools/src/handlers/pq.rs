//! PQ theme: thin wrappers over [`dh_pq::PqSubsystem`] (§4.8).

use async_trait::async_trait;
use dh_domain::trace::TraceEvent;
use dh_domain::{PqDescriptor, ToolEnvelope};
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::params;

fn emit_state_changed(system_key: &str, descriptor: &PqDescriptor) {
    TraceEvent::PqStateChanged {
        system_key: system_key.to_string(),
        serial: descriptor.serial,
        name: descriptor.name.clone(),
        state: format!("{:?}", descriptor.state),
    }
    .emit();
}

/// `serial` if present, else resolved from `name` via `pq_name_to_id`
/// (§4.8 "Identification: by serial or by name").
async fn resolve_serial(
    ctx: &RequestContext,
    system_key: &str,
    controller: &std::sync::Arc<dyn dh_resources::ControllerClient>,
    args: &Value,
) -> dh_domain::Result<i64> {
    if let Some(serial) = args::i64_opt(args, "serial")? {
        return Ok(serial);
    }
    let name = args::str_req(args, "name")?;
    ctx.pq.name_to_id(system_key, controller, name).await
}

pub struct PqList;

#[async_trait]
impl ToolHandler for PqList {
    fn name(&self) -> &'static str {
        "pq_list"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let system_key = match args::str_req(&args, "system_name") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let system = match ctx.registry.enterprise_system(system_key).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        let controller = match system.controller().await {
            Ok(c) => c,
            Err(e) => return ToolEnvelope::err(e),
        };
        let pqs = ctx.pq.list(system_key, &controller).await;
        let mut payload = Map::new();
        payload.insert("pqs".into(), json!(pqs));
        ToolEnvelope::ok(payload)
    }
}

pub struct PqDetails;

#[async_trait]
impl ToolHandler for PqDetails {
    fn name(&self) -> &'static str {
        "pq_details"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match details(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn details(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let serial = resolve_serial(ctx, system_key, &controller, args).await?;
    let descriptor = ctx.pq.details(system_key, &controller, serial).await?;
    let mut payload = Map::new();
    payload.insert("pq".into(), json!(descriptor));
    Ok(payload)
}

pub struct PqNameToId;

#[async_trait]
impl ToolHandler for PqNameToId {
    fn name(&self) -> &'static str {
        "pq_name_to_id"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match name_to_id(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn name_to_id(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let name = args::str_req(args, "name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let serial = ctx.pq.name_to_id(system_key, &controller, name).await?;
    let mut payload = Map::new();
    payload.insert("serial".into(), json!(serial));
    Ok(payload)
}

pub struct PqCreate;

#[async_trait]
impl ToolHandler for PqCreate {
    fn name(&self) -> &'static str {
        "pq_create"
    }

    /// Just the `add_query` half of a PQ lifecycle — see
    /// `session_enterprise_create` for the full build-and-connect
    /// procedure (§4.5, §4.8).
    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match create(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn create(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let name = args::str_req(args, "name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let defaults = &system.config().session_creation.defaults;
    let create_params = params::resolve_pq_create_params(name, args, defaults)?;
    let controller = system.controller().await?;
    let serial = ctx.pq.create(controller.as_ref(), create_params).await?;
    let mut payload = Map::new();
    payload.insert("serial".into(), json!(serial));
    Ok(payload)
}

pub struct PqModify;

#[async_trait]
impl ToolHandler for PqModify {
    fn name(&self) -> &'static str {
        "pq_modify"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match modify(ctx, &args).await {
            Ok(()) => ToolEnvelope::ok_empty(),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn modify(ctx: &RequestContext, args: &Value) -> dh_domain::Result<()> {
    let system_key = args::str_req(args, "system_name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let defaults = &system.config().session_creation.defaults;
    let controller = system.controller().await?;
    let serial = resolve_serial(ctx, system_key, &controller, args).await?;

    // Preserve the existing name unless the caller is explicitly renaming —
    // `resolve_pq_create_params` otherwise has nothing to fall back on. Read
    // the controller's live snapshot directly rather than the subsystem's
    // polled cache, which may not have observed this PQ yet.
    let existing = controller
        .snapshot()
        .into_iter()
        .find(|pq| pq.serial == serial)
        .ok_or_else(|| dh_domain::CoreError::unknown_session(system_key, &serial.to_string()))?;
    let name = args::str_opt(args, "name").unwrap_or(&existing.name).to_string();
    let params = params::resolve_pq_create_params(&name, args, defaults)?;
    ctx.pq.modify(controller.as_ref(), serial, params).await
}

pub struct PqStart;

#[async_trait]
impl ToolHandler for PqStart {
    fn name(&self) -> &'static str {
        "pq_start"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match start(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn start(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let timeout_seconds = args::f64_opt(args, "timeout_seconds")?;

    let serial = args::i64_opt(args, "serial")?;
    let params = match serial {
        Some(_) => None,
        None => {
            let defaults = &system.config().session_creation.defaults;
            let name = args::str_req(args, "name")?;
            Some(params::resolve_pq_create_params(name, args, defaults)?)
        }
    };

    let descriptor = ctx.pq.start(controller.as_ref(), serial, params, timeout_seconds).await?;
    emit_state_changed(system_key, &descriptor);
    let mut payload = Map::new();
    payload.insert("pq".into(), json!(descriptor));
    Ok(payload)
}

pub struct PqStop;

#[async_trait]
impl ToolHandler for PqStop {
    fn name(&self) -> &'static str {
        "pq_stop"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match stop(ctx, &args).await {
            Ok(()) => ToolEnvelope::ok_empty(),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn stop(ctx: &RequestContext, args: &Value) -> dh_domain::Result<()> {
    let system_key = args::str_req(args, "system_name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let serial = resolve_serial(ctx, system_key, &controller, args).await?;
    let timeout_seconds = args::f64_opt(args, "timeout_seconds")?;
    ctx.pq.stop(controller.as_ref(), serial, timeout_seconds).await
}

pub struct PqRestart;

#[async_trait]
impl ToolHandler for PqRestart {
    fn name(&self) -> &'static str {
        "pq_restart"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match restart(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn restart(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let system_key = args::str_req(args, "system_name")?;
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let serial = resolve_serial(ctx, system_key, &controller, args).await?;
    let timeout_seconds = args::f64_opt(args, "timeout_seconds")?;
    let descriptor = ctx.pq.restart(controller.as_ref(), serial, timeout_seconds).await?;
    emit_state_changed(system_key, &descriptor);
    let mut payload = Map::new();
    payload.insert("pq".into(), json!(descriptor));
    Ok(payload)
}

pub struct PqDelete;

#[async_trait]
impl ToolHandler for PqDelete {
    fn name(&self) -> &'static str {
        "pq_delete"
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
    let system = ctx.registry.enterprise_system(system_key).await?;
    let controller = system.controller().await?;
    let serial = resolve_serial(ctx, system_key, &controller, args).await?;
    ctx.pq.delete(controller.as_ref(), serial).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enterprise_config() -> &'static str {
        r#"{"enterprise": {"systems": {"prod": {"connection_json_url": "https://ctrl.example", "auth_type": "password", "username": "u", "password": "p"}}}}"#
    }

    #[tokio::test]
    async fn create_start_stop_delete_round_trip_by_serial() {
        let ctx = crate::test_support::context_with_registry(enterprise_config()).await;

        let created = PqCreate.call(&ctx, json!({"system_name": "prod", "name": "w1"})).await.into_json();
        let serial = created["serial"].as_i64().unwrap();

        let started = PqStart.call(&ctx, json!({"system_name": "prod", "serial": serial})).await;
        assert!(started.is_success());

        let stopped = PqStop.call(&ctx, json!({"system_name": "prod", "serial": serial})).await;
        assert!(stopped.is_success());

        let deleted = PqDelete.call(&ctx, json!({"system_name": "prod", "serial": serial})).await;
        assert!(deleted.is_success());
    }

    #[tokio::test]
    async fn modify_preserves_name_when_not_given() {
        let ctx = crate::test_support::context_with_registry(enterprise_config()).await;
        let created = PqCreate.call(&ctx, json!({"system_name": "prod", "name": "w3"})).await.into_json();
        let serial = created["serial"].as_i64().unwrap();

        let modified = PqModify.call(&ctx, json!({"system_name": "prod", "serial": serial, "heap_size_gb": 8.0})).await;
        assert!(modified.is_success());

        // `name_to_id` forces a live refresh on a cache miss, so this
        // observes the modification without racing the background poller.
        let resolved = PqNameToId.call(&ctx, json!({"system_name": "prod", "name": "w3"})).await.into_json();
        assert_eq!(resolved["serial"], json!(serial));
    }

    #[tokio::test]
    async fn name_to_id_resolves_a_pq_created_by_name() {
        let ctx = crate::test_support::context_with_registry(enterprise_config()).await;
        PqCreate.call(&ctx, json!({"system_name": "prod", "name": "w2"})).await;

        let resolved = PqNameToId.call(&ctx, json!({"system_name": "prod", "name": "w2"})).await.into_json();
        assert_eq!(resolved["success"], Value::Bool(true));
    }

    #[tokio::test]
    async fn neither_serial_nor_name_fails_invalid_argument() {
        let ctx = crate::test_support::context_with_registry(enterprise_config()).await;
        let envelope = PqDetails.call(&ctx, json!({"system_name": "prod"})).await;
        match envelope {
            ToolEnvelope::Failure { kind, .. } => assert_eq!(kind, dh_domain::ErrorKind::InvalidArgument),
            _ => panic!("expected failure"),
        }
    }
}

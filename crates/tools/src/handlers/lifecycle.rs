//! Lifecycle theme: `reload` (§4.7, §4.10).

use async_trait::async_trait;
use dh_domain::ToolEnvelope;
use serde_json::Value;

use crate::context::RequestContext;
use crate::dispatch::ToolHandler;

pub struct Reload;

#[async_trait]
impl ToolHandler for Reload {
    fn name(&self) -> &'static str {
        "reload"
    }

    /// Re-reads and re-validates the config document, then rebuilds the
    /// registry's skeleton managers from it. Returns `{success:true}` even
    /// if a configured manager later fails to build lazily — only a
    /// `ConfigInvalid` failure during the re-read itself is surfaced here
    /// (§4.7, §7).
    async fn call(&self, ctx: &RequestContext, _args: Value) -> ToolEnvelope {
        let config = match ctx.config.reload() {
            Ok(config) => config,
            Err(e) => return ToolEnvelope::err(e),
        };
        ctx.registry.replace_from_config(&config).await;
        ctx.pq.close_all().await;
        ToolEnvelope::ok_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reload_on_unchanged_config_keeps_registry_empty() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        let envelope = Reload.call(&ctx, Value::Null).await;
        assert!(envelope.is_success());
        assert_eq!(ctx.registry.community_count().await, 0);
    }

    #[tokio::test]
    async fn reload_with_invalid_document_on_disk_surfaces_config_invalid() {
        let ctx = crate::test_support::context_with_registry("{}").await;
        std::fs::write(ctx.config.path(), "{not valid json").unwrap();
        let envelope = Reload.call(&ctx, Value::Null).await;
        match envelope {
            ToolEnvelope::Failure { kind, .. } => assert_eq!(kind, dh_domain::ErrorKind::ConfigInvalid),
            _ => panic!("expected failure"),
        }
    }
}

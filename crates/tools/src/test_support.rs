//! Shared test fixtures for handler tests: a `RequestContext` wired to
//! simulated builders plus an on-disk config file, so every handler module
//! can build a context from a literal JSON document without repeating the
//! registry/config-store wiring.

use std::path::PathBuf;
use std::sync::Arc;

use dh_domain::config::ConfigStore;
use dh_pq::PqSubsystem;
use dh_resources::community::SimulatedCommunityClientBuilder;
use dh_resources::engine_client::ConnectCounter;
use dh_resources::enterprise_system::SimulatedEnterpriseClientBuilder;
use dh_resources::ResourceRegistry;

use crate::context::RequestContext;

fn write_temp_config(raw: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("dh-tools-test-{}-{:p}.json", std::process::id(), raw));
    std::fs::write(&path, raw).unwrap();
    path
}

/// An empty-config context (no community sessions, no enterprise systems).
pub fn context() -> RequestContext {
    context_from_config("{}")
}

pub fn context_from_config(raw: &str) -> RequestContext {
    let path = write_temp_config(raw);
    let config_store = Arc::new(ConfigStore::load(path).unwrap());
    let registry = Arc::new(ResourceRegistry::new(
        Arc::new(SimulatedCommunityClientBuilder { counter: ConnectCounter::new() }),
        Arc::new(SimulatedEnterpriseClientBuilder),
    ));
    let ctx = RequestContext::new(config_store, registry, Arc::new(PqSubsystem::new()));
    ctx
}

/// Like [`context_from_config`] but also runs `replace_from_config` so the
/// registry actually has entries for whatever the document declares.
pub async fn context_with_registry(raw: &str) -> RequestContext {
    let ctx = context_from_config(raw);
    ctx.registry.replace_from_config(&ctx.config.current()).await;
    ctx
}

//! Process-wide construction of the core components (§4.10): Config Store,
//! Resource Registry and PQ Subsystem, bound into one [`RequestContext`].

use std::sync::Arc;

use anyhow::Context;
use dh_domain::config::{ConfigSeverity, ConfigStore};
use dh_pq::PqSubsystem;
use dh_resources::community::SimulatedCommunityClientBuilder;
use dh_resources::engine_client::ConnectCounter;
use dh_resources::enterprise_system::SimulatedEnterpriseClientBuilder;
use dh_resources::ResourceRegistry;
use dh_tools::RequestContext;

/// Loads the config document named by `DH_MCP_CONFIG_FILE`, logs any
/// structural warnings, and builds a [`RequestContext`] with the registry
/// populated from it. The engine/controller wire protocols are external
/// client libraries (spec.md §1); the registry is wired against the
/// simulated builders that stand in for them until a real one is linked in.
pub async fn build_context() -> anyhow::Result<RequestContext> {
    let config = ConfigStore::load_from_env().context("loading configuration")?;

    let issues = config.current().validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    let registry = Arc::new(ResourceRegistry::new(
        Arc::new(SimulatedCommunityClientBuilder { counter: ConnectCounter::new() }),
        Arc::new(SimulatedEnterpriseClientBuilder),
    ));
    registry.replace_from_config(&config.current()).await;
    tracing::info!(
        community = registry.community_count().await,
        enterprise_systems = registry.enterprise_system_count().await,
        "resource registry ready"
    );

    let pq = Arc::new(PqSubsystem::new());

    Ok(RequestContext::new(Arc::new(config), registry, pq))
}

/// Closes every manager and PQ subscription (§4.10 graceful shutdown).
pub async fn shutdown(ctx: &RequestContext) {
    ctx.registry.close_all().await;
    ctx.pq.close_all().await;
}

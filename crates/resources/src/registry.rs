//! Resource Registry (C6): keyed cache of managers with per-key build
//! locks and a global replacement lock (§4.6).

use std::collections::HashMap;
use std::sync::Arc;

use dh_domain::config::Config;
use dh_domain::{CoreError, ErrorKind, Result, SessionId, SessionKind};
use tokio::sync::RwLock as AsyncRwLock;

use crate::community::{CommunityClientBuilder, CommunitySessionManager};
use crate::enterprise_session::EnterpriseSessionManager;
use crate::enterprise_system::{EnterpriseClientBuilder, EnterpriseSystemManager};

struct RegistryMaps {
    community: HashMap<String, Arc<CommunitySessionManager>>,
    enterprise_systems: HashMap<String, Arc<EnterpriseSystemManager>>,
}

/// The registry's replacement lock is writer-exclusive across the whole
/// map pair and is never held across a manager build (§4.6) — only across
/// the swap itself, which is pure in-memory bookkeeping.
pub struct ResourceRegistry {
    maps: AsyncRwLock<RegistryMaps>,
    community_builder: Arc<dyn CommunityClientBuilder>,
    enterprise_builder: Arc<dyn EnterpriseClientBuilder>,
}

impl ResourceRegistry {
    pub fn new(
        community_builder: Arc<dyn CommunityClientBuilder>,
        enterprise_builder: Arc<dyn EnterpriseClientBuilder>,
    ) -> Self {
        Self {
            maps: AsyncRwLock::new(RegistryMaps { community: HashMap::new(), enterprise_systems: HashMap::new() }),
            community_builder,
            enterprise_builder,
        }
    }

    pub async fn community(&self, key: &str) -> Result<Arc<CommunitySessionManager>> {
        let maps = self.maps.read().await;
        maps.community
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::unknown_source(key))
    }

    pub async fn enterprise_system(&self, key: &str) -> Result<Arc<EnterpriseSystemManager>> {
        let maps = self.maps.read().await;
        maps.enterprise_systems
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::unknown_source(key))
    }

    /// Delegates to the system's child map; if missing and `session_name`
    /// does not match a configured session, fails `UnknownSession` (§4.6).
    pub async fn enterprise_session(&self, system_key: &str, session_name: &str) -> Result<Arc<EnterpriseSessionManager>> {
        let system = self.enterprise_system(system_key).await?;
        system
            .enterprise_session(session_name)
            .ok_or_else(|| CoreError::unknown_session(system_key, session_name))
    }

    /// All configured community source keys, for discovery handlers that
    /// need to enumerate sources rather than already-registered sessions.
    pub async fn community_keys(&self) -> Vec<String> {
        self.maps.read().await.community.keys().cloned().collect()
    }

    /// All configured enterprise system keys (§4.7 `enterprise_systems_status`
    /// iterates these to report a status per system, not per session).
    pub async fn enterprise_system_keys(&self) -> Vec<String> {
        self.maps.read().await.enterprise_systems.keys().cloned().collect()
    }

    /// Cheap; does not touch managers (§4.6).
    pub async fn list_all(&self) -> Vec<(SessionId, String, String)> {
        let maps = self.maps.read().await;
        let mut out = Vec::new();
        for key in maps.community.keys() {
            out.push((SessionId::new(SessionKind::Community, key.clone(), key.clone()), key.clone(), key.clone()));
        }
        for (sys_key, system) in &maps.enterprise_systems {
            for name in system.enterprise_sessions().keys() {
                out.push((
                    SessionId::new(SessionKind::Enterprise, sys_key.clone(), name.clone()),
                    sys_key.clone(),
                    name.clone(),
                ));
            }
        }
        out
    }

    /// Takes the replacement lock, walks both maps, closes every manager
    /// (each enterprise system closes its children first), clears maps
    /// (§4.6). Individual close failures are logged and aggregated but do
    /// not abort the walk — managers have no fallible `close()`, so this
    /// can never actually fail, but the walk-everything discipline mirrors
    /// the source contract for when closes do become fallible.
    pub async fn close_all(&self) -> usize {
        let mut maps = self.maps.write().await;
        let mut closed = 0;
        for (key, manager) in maps.community.drain() {
            tracing::debug!(source_key = %key, "closing community session manager");
            manager.close().await;
            closed += 1;
        }
        for (key, manager) in maps.enterprise_systems.drain() {
            tracing::debug!(source_key = %key, "closing enterprise system manager");
            manager.close().await;
            closed += 1;
        }
        closed
    }

    /// Under the replacement lock: close everything, then rebuild skeleton
    /// managers (each `UNINITIALIZED`) for every configured key (§4.6).
    pub async fn replace_from_config(&self, config: &Config) {
        dh_domain::trace::TraceEvent::RegistryReloadStarted.emit();
        let managers_closed = self.close_all().await;

        let mut maps = self.maps.write().await;
        for (key, session_config) in &config.community.sessions {
            maps.community.insert(
                key.clone(),
                Arc::new(CommunitySessionManager::new(key.clone(), session_config.clone(), self.community_builder.clone())),
            );
        }
        for (key, system_config) in &config.enterprise.systems {
            maps.enterprise_systems.insert(
                key.clone(),
                Arc::new(EnterpriseSystemManager::new(key.clone(), system_config.clone(), self.enterprise_builder.clone())),
            );
        }

        dh_domain::trace::TraceEvent::RegistryReloadCompleted {
            community_sessions: maps.community.len(),
            enterprise_systems: maps.enterprise_systems.len(),
            managers_closed,
        }
        .emit();
    }

    pub async fn community_count(&self) -> usize {
        self.maps.read().await.community.len()
    }

    pub async fn enterprise_system_count(&self) -> usize {
        self.maps.read().await.enterprise_systems.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::SimulatedCommunityClientBuilder;
    use crate::engine_client::ConnectCounter;
    use crate::enterprise_system::SimulatedEnterpriseClientBuilder;
    use dh_domain::config::CommunitySessionConfig;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(
            Arc::new(SimulatedCommunityClientBuilder { counter: ConnectCounter::new() }),
            Arc::new(SimulatedEnterpriseClientBuilder),
        )
    }

    fn community_session_config() -> CommunitySessionConfig {
        CommunitySessionConfig {
            host: "localhost".into(),
            port: 10000,
            auth_type: "anonymous".into(),
            auth_token: None,
            auth_token_env_var: None,
            session_type: dh_domain::config::SessionLanguage::Python,
            never_timeout: false,
            use_tls: false,
            tls_root_certs: None,
            client_cert_chain: None,
            client_private_key: None,
        }
    }

    #[tokio::test]
    async fn unknown_source_fails_lookup() {
        let registry = registry();
        let err = registry.community("missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownSource);
    }

    #[tokio::test]
    async fn replace_from_config_populates_maps_from_config_only() {
        let registry = registry();
        let mut config = Config::default();
        config.community.sessions.insert("local".into(), community_session_config());

        registry.replace_from_config(&config).await;
        assert_eq!(registry.community_count().await, 1);
        assert!(registry.community("local").await.is_ok());

        registry.replace_from_config(&Config::default()).await;
        assert_eq!(registry.community_count().await, 0);
    }

    #[tokio::test]
    async fn list_all_round_trips_through_session_id_parsing() {
        let registry = registry();
        let mut config = Config::default();
        config.community.sessions.insert("local".into(), community_session_config());
        registry.replace_from_config(&config).await;

        let listed = registry.list_all().await;
        assert_eq!(listed.len(), 1);
        let (id, source, name) = &listed[0];
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(&parsed.source, source);
        assert_eq!(&parsed.name, name);
    }
}

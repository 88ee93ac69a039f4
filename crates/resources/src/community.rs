//! Community Session Manager (C3): owns the lifecycle of one direct-connect
//! engine session, from config to live RPC channel (§4.3).

use std::sync::Arc;

use dh_domain::config::CommunitySessionConfig;
use dh_domain::{CoreError, ErrorKind, Result};
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;

use crate::auth::{self, CredentialSource};
use crate::engine_client::{ConnectCounter, EngineClient, SimulatedEngineClient};
use crate::session::Session;

#[derive(Clone)]
enum ManagerState {
    Uninitialized,
    Initializing,
    Ready(Arc<dyn EngineClient>),
    Failed(CoreError),
    Closed,
}

/// Builds an [`EngineClient`] for a resolved community session config. A
/// trait rather than a free function so tests can substitute a counting
/// stub without touching manager logic — the production implementation
/// would dial the real engine wire client here.
pub trait CommunityClientBuilder: Send + Sync {
    fn connect(&self, config: &CommunitySessionConfig, auth: auth::CommunityAuth) -> Result<Arc<dyn EngineClient>>;
}

/// Default builder: a simulated connection, useful until a real engine
/// client library is wired in. `counter` lets tests observe how many times
/// the build procedure actually ran (testable property 1 / scenario S3).
pub struct SimulatedCommunityClientBuilder {
    pub counter: ConnectCounter,
}

impl CommunityClientBuilder for SimulatedCommunityClientBuilder {
    fn connect(&self, _config: &CommunitySessionConfig, _auth: auth::CommunityAuth) -> Result<Arc<dyn EngineClient>> {
        Ok(Arc::new(SimulatedEngineClient::connect(&self.counter)))
    }
}

pub struct CommunitySessionManager {
    key: String,
    config: CommunitySessionConfig,
    builder: Arc<dyn CommunityClientBuilder>,
    state: RwLock<ManagerState>,
    build_lock: AsyncMutex<()>,
}

impl std::fmt::Debug for CommunitySessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommunitySessionManager")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CommunitySessionManager {
    pub fn new(key: impl Into<String>, config: CommunitySessionConfig, builder: Arc<dyn CommunityClientBuilder>) -> Self {
        Self {
            key: key.into(),
            config,
            builder,
            state: RwLock::new(ManagerState::Uninitialized),
            build_lock: AsyncMutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &CommunitySessionConfig {
        &self.config
    }

    /// Cheap, non-blocking liveness probe (§4.3).
    pub fn is_alive(&self) -> bool {
        matches!(&*self.state.read(), ManagerState::Ready(c) if c.is_alive())
    }

    /// Returns a live session, building once if necessary. Never returns a
    /// non-live session (§4.3).
    pub async fn get(&self) -> Result<Session> {
        {
            let state = self.state.read();
            if let ManagerState::Ready(client) = &*state {
                if client.is_alive() {
                    return Ok(Session::Community(client.clone()));
                }
            }
            if matches!(&*state, ManagerState::Closed) {
                return Err(CoreError::new(
                    ErrorKind::UnknownSource,
                    format!("community session {} has been closed", self.key),
                ));
            }
        }

        // The build lock is the "at-most-one concurrent builder per key"
        // serialization point (§5). It is released before returning, never
        // held across the cached client's own RPCs.
        let _guard = self.build_lock.lock().await;

        // Re-check under the build lock: a racing caller may have already
        // completed the build while we waited.
        {
            let state = self.state.read();
            if let ManagerState::Ready(client) = &*state {
                if client.is_alive() {
                    dh_domain::trace::TraceEvent::ManagerBuildCoalesced { session_id: self.key.clone() }.emit();
                    return Ok(Session::Community(client.clone()));
                }
            }
            if matches!(&*state, ManagerState::Closed) {
                return Err(CoreError::new(
                    ErrorKind::UnknownSource,
                    format!("community session {} has been closed", self.key),
                ));
            }
        }

        dh_domain::trace::TraceEvent::ManagerBuildStarted { session_id: self.key.clone() }.emit();
        *self.state.write() = ManagerState::Initializing;
        match self.build().await {
            Ok(client) => {
                *self.state.write() = ManagerState::Ready(client.clone());
                dh_domain::trace::TraceEvent::ManagerReady { session_id: self.key.clone() }.emit();
                Ok(Session::Community(client))
            }
            Err(e) => {
                *self.state.write() = ManagerState::Failed(e.clone());
                dh_domain::trace::TraceEvent::ManagerFailed { session_id: self.key.clone(), error_kind: format!("{:?}", e.kind) }.emit();
                Err(e)
            }
        }
    }

    /// Build procedure (§4.3 steps 3-6); the build lock is already held by
    /// the caller.
    async fn build(&self) -> Result<Arc<dyn EngineClient>> {
        let credential = CredentialSource::from_ref(&self.config.auth_credential());
        let resolved = auth::resolve_community_auth(&self.config.auth_type, credential)?;

        if self.config.use_tls {
            for (path, label) in [
                (&self.config.tls_root_certs, "tls_root_certs"),
                (&self.config.client_cert_chain, "client_cert_chain"),
                (&self.config.client_private_key, "client_private_key"),
            ] {
                if let Some(p) = path {
                    tokio::fs::metadata(p).await.map_err(|e| {
                        CoreError::remote_unavailable(format!("failed to load {label}: {e}"))
                    })?;
                }
            }
        }

        if self.config.never_timeout {
            tracing::warn!(
                source_key = %self.key,
                "never_timeout is advisory; honored only if the engine client exposes a keep-alive knob"
            );
        }

        self.builder.connect(&self.config, resolved)
    }

    /// Idempotent close; transitions to `CLOSED`. A concurrent `get()`
    /// racing with this observes failure and must not retry (§4.3).
    pub async fn close(&self) {
        let _guard = self.build_lock.lock().await;
        let previous = std::mem::replace(&mut *self.state.write(), ManagerState::Closed);
        if let ManagerState::Ready(client) = previous {
            client.close().await;
        }
        dh_domain::trace::TraceEvent::ManagerClosed { session_id: self.key.clone() }.emit();
    }

    pub fn last_error(&self) -> Option<CoreError> {
        match &*self.state.read() {
            ManagerState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> CommunitySessionConfig {
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
    async fn get_builds_once_and_caches() {
        let counter = ConnectCounter::new();
        let builder = Arc::new(SimulatedCommunityClientBuilder { counter: counter.clone() });
        let mgr = CommunitySessionManager::new("s1", config(), builder);

        mgr.get().await.unwrap();
        mgr.get().await.unwrap();
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn concurrent_get_calls_coalesce_into_one_build() {
        let counter = ConnectCounter::new();
        let builder = Arc::new(SimulatedCommunityClientBuilder { counter: counter.clone() });
        let mgr = Arc::new(CommunitySessionManager::new("s1", config(), builder));

        let attempts = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..20 {
            let mgr = mgr.clone();
            let attempts = attempts.clone();
            handles.push(tokio::spawn(async move {
                let result = mgr.get().await;
                if result.is_ok() {
                    attempts.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(counter.count(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 20);
    }

    /// A builder that hands out clients through a shared slot so the test
    /// can kill the most recently built one and assert a rebuild follows.
    struct KillableBuilder {
        counter: ConnectCounter,
        last: parking_lot::Mutex<Option<Arc<SimulatedEngineClient>>>,
    }

    impl CommunityClientBuilder for KillableBuilder {
        fn connect(&self, _config: &CommunitySessionConfig, _auth: auth::CommunityAuth) -> Result<Arc<dyn EngineClient>> {
            let client = Arc::new(SimulatedEngineClient::connect(&self.counter));
            *self.last.lock() = Some(client.clone());
            Ok(client)
        }
    }

    #[tokio::test]
    async fn dead_client_triggers_rebuild_on_next_get() {
        let counter = ConnectCounter::new();
        let builder = Arc::new(KillableBuilder { counter: counter.clone(), last: parking_lot::Mutex::new(None) });
        let mgr = CommunitySessionManager::new("s1", config(), builder.clone());

        mgr.get().await.unwrap();
        assert_eq!(counter.count(), 1);
        builder.last.lock().as_ref().unwrap().kill();

        mgr.get().await.unwrap();
        assert_eq!(counter.count(), 2);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_get() {
        let counter = ConnectCounter::new();
        let builder = Arc::new(SimulatedCommunityClientBuilder { counter });
        let mgr = CommunitySessionManager::new("s1", config(), builder);

        mgr.get().await.unwrap();
        mgr.close().await;
        mgr.close().await;
        let err = mgr.get().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownSource);
    }

    #[tokio::test]
    async fn auth_failure_transitions_to_failed_and_records_error() {
        let mut cfg = config();
        cfg.auth_type = "basic".into();
        let counter = ConnectCounter::new();
        let builder = Arc::new(SimulatedCommunityClientBuilder { counter });
        let mgr = CommunitySessionManager::new("s1", cfg, builder);

        let err = mgr.get().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthResolution);
        assert!(mgr.last_error().is_some());
    }
}

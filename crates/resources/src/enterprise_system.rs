//! Enterprise System Manager (C4): owns the lifecycle of one controller
//! connection (auth + controller client) and is a factory for Enterprise
//! Session Managers (§4.4).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dh_domain::config::EnterpriseSystemConfig;
use dh_domain::{CoreError, ErrorKind, Result};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::auth::{self, CredentialSource, EnterpriseAuth};
use crate::engine_client::ControllerClient;
use crate::enterprise_session::EnterpriseSessionManager;

#[derive(Clone)]
enum ManagerState {
    Uninitialized,
    Initializing,
    Ready { controller: Arc<dyn ControllerClient>, auth: Arc<EnterpriseAuth> },
    Failed(CoreError),
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    Online,
    Offline,
    Unauthorized,
    Misconfigured,
    Unknown,
}

/// Builds the auth + controller clients for a system. Grounded in the same
/// builder-trait seam as [`crate::community::CommunityClientBuilder`], so
/// a future real controller client library slots in without touching
/// manager logic.
pub trait EnterpriseClientBuilder: Send + Sync {
    fn connect(&self, config: &EnterpriseSystemConfig, auth: EnterpriseAuth) -> Result<Arc<dyn ControllerClient>>;
}

pub struct SimulatedEnterpriseClientBuilder;

impl EnterpriseClientBuilder for SimulatedEnterpriseClientBuilder {
    fn connect(&self, _config: &EnterpriseSystemConfig, _auth: EnterpriseAuth) -> Result<Arc<dyn ControllerClient>> {
        Ok(Arc::new(crate::engine_client::SimulatedControllerClient::new()))
    }
}

pub struct EnterpriseSystemManager {
    key: String,
    config: EnterpriseSystemConfig,
    builder: Arc<dyn EnterpriseClientBuilder>,
    state: RwLock<ManagerState>,
    build_lock: AsyncMutex<()>,
    sessions: RwLock<HashMap<String, Arc<EnterpriseSessionManager>>>,
}

impl EnterpriseSystemManager {
    pub fn new(key: impl Into<String>, config: EnterpriseSystemConfig, builder: Arc<dyn EnterpriseClientBuilder>) -> Self {
        Self {
            key: key.into(),
            config,
            builder,
            state: RwLock::new(ManagerState::Uninitialized),
            build_lock: AsyncMutex::new(()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &EnterpriseSystemConfig {
        &self.config
    }

    pub fn is_alive(&self) -> bool {
        matches!(&*self.state.read(), ManagerState::Ready { controller, .. } if controller.is_alive())
    }

    /// Obtain the controller client, building the system (auth + controller
    /// handshake) once if necessary.
    pub async fn controller(&self) -> Result<Arc<dyn ControllerClient>> {
        {
            let state = self.state.read();
            if let ManagerState::Ready { controller, .. } = &*state {
                if controller.is_alive() {
                    return Ok(controller.clone());
                }
            }
            if matches!(&*state, ManagerState::Closed) {
                return Err(CoreError::new(
                    ErrorKind::UnknownSource,
                    format!("enterprise system {} has been closed", self.key),
                ));
            }
        }

        let _guard = self.build_lock.lock().await;
        {
            let state = self.state.read();
            if let ManagerState::Ready { controller, .. } = &*state {
                if controller.is_alive() {
                    dh_domain::trace::TraceEvent::ManagerBuildCoalesced { session_id: self.key.clone() }.emit();
                    return Ok(controller.clone());
                }
            }
        }

        dh_domain::trace::TraceEvent::ManagerBuildStarted { session_id: self.key.clone() }.emit();
        *self.state.write() = ManagerState::Initializing;
        match self.build().await {
            Ok((controller, auth)) => {
                *self.state.write() = ManagerState::Ready { controller: controller.clone(), auth: Arc::new(auth) };
                dh_domain::trace::TraceEvent::ManagerReady { session_id: self.key.clone() }.emit();
                Ok(controller)
            }
            Err(e) => {
                *self.state.write() = ManagerState::Failed(e.clone());
                dh_domain::trace::TraceEvent::ManagerFailed { session_id: self.key.clone(), error_kind: format!("{:?}", e.kind) }.emit();
                Err(e)
            }
        }
    }

    async fn build(&self) -> Result<(Arc<dyn ControllerClient>, EnterpriseAuth)> {
        let password = CredentialSource::from_ref(&self.config.password_credential());
        let auth = auth::resolve_enterprise_auth(
            self.config.auth_type,
            self.config.username.as_deref(),
            password,
            self.config.private_key_path.as_deref(),
        )
        .await?;

        let controller = self.builder.connect(&self.config, auth.clone())?;
        let handshake_timeout = Duration::from_secs(dh_domain::config::DEFAULT_CONTROLLER_HANDSHAKE_TIMEOUT_SECS);
        tokio::time::timeout(handshake_timeout, controller.handshake(handshake_timeout))
            .await
            .map_err(|_| CoreError::timeout("controller handshake timed out"))??;

        Ok((controller, auth))
    }

    /// Lightweight status unless `probe` requests an active handshake (§4.4).
    pub async fn status(&self, probe: bool) -> (SystemStatus, String) {
        if probe {
            return match self.controller().await {
                Ok(_) => (SystemStatus::Online, "controller handshake succeeded".into()),
                Err(e) if e.kind == ErrorKind::AuthResolution => {
                    (SystemStatus::Unauthorized, e.message)
                }
                Err(e) if e.kind == ErrorKind::ConfigInvalid => {
                    (SystemStatus::Misconfigured, e.message)
                }
                Err(e) => (SystemStatus::Offline, e.message),
            };
        }
        match &*self.state.read() {
            ManagerState::Ready { controller, .. } if controller.is_alive() => {
                (SystemStatus::Online, "existing connection is alive".into())
            }
            ManagerState::Ready { .. } => (SystemStatus::Offline, "cached connection is dead".into()),
            ManagerState::Failed(e) => (SystemStatus::Unknown, e.message.clone()),
            ManagerState::Closed => (SystemStatus::Offline, "system has been closed".into()),
            _ => (SystemStatus::Unknown, "not yet built".into()),
        }
    }

    /// Register a session manager built at registry-build time for a
    /// configured session (§4.5 variant 1), or one minted dynamically by
    /// `session_enterprise_create` (§4.5 variant 2).
    pub fn insert_session(&self, name: impl Into<String>, session: Arc<EnterpriseSessionManager>) {
        self.sessions.write().insert(name.into(), session);
    }

    pub fn enterprise_sessions(&self) -> HashMap<String, Arc<EnterpriseSessionManager>> {
        self.sessions.read().clone()
    }

    pub fn enterprise_session(&self, name: &str) -> Option<Arc<EnterpriseSessionManager>> {
        self.sessions.read().get(name).cloned()
    }

    pub fn remove_session(&self, name: &str) -> Option<Arc<EnterpriseSessionManager>> {
        self.sessions.write().remove(name)
    }

    /// Closes all C5 children first, then the controller, then the auth
    /// client — no child may outlive its parent (§4.4).
    pub async fn close(&self) {
        let children: Vec<_> = self.sessions.write().drain().map(|(_, s)| s).collect();
        for session in &children {
            session.close().await;
        }

        let _guard = self.build_lock.lock().await;
        let previous = std::mem::replace(&mut *self.state.write(), ManagerState::Closed);
        if let ManagerState::Ready { controller, .. } = previous {
            controller.close().await;
        }
        dh_domain::trace::TraceEvent::ManagerClosed { session_id: self.key.clone() }.emit();
    }
}

//! Enterprise Session Manager (C5): owns one controller-brokered engine
//! worker session, including PQ serial tracking (§4.5).

use std::sync::Arc;

use dh_domain::Result;
use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;

use crate::engine_client::{ControllerClient, EngineClient};
use crate::session::Session;

pub struct EnterpriseSessionManager {
    name: String,
    /// The PQ serial this session is bound to, assigned after a successful
    /// create (§4.5 "Additional state").
    pq_serial: i64,
    controller: Arc<dyn ControllerClient>,
    client: RwLock<Option<Arc<dyn EngineClient>>>,
    build_lock: AsyncMutex<()>,
    closed: std::sync::atomic::AtomicBool,
}

impl EnterpriseSessionManager {
    pub fn new(name: impl Into<String>, pq_serial: i64, controller: Arc<dyn ControllerClient>) -> Self {
        Self {
            name: name.into(),
            pq_serial,
            controller,
            client: RwLock::new(None),
            build_lock: AsyncMutex::new(()),
            closed: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pq_serial(&self) -> i64 {
        self.pq_serial
    }

    pub fn is_alive(&self) -> bool {
        matches!(&*self.client.read(), Some(c) if c.is_alive())
    }

    /// Connects (Barrage-style, via the controller) to the bound PQ, caching
    /// the session. Step 5 of the §4.5 build procedure, split out so
    /// `session_enterprise_create` can drive steps 1-4 (config resolution,
    /// `add_query`, `start_and_wait`) before calling this.
    pub async fn get(&self) -> Result<Session> {
        if self.closed.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(dh_domain::CoreError::new(
                dh_domain::ErrorKind::UnknownSession,
                format!("enterprise session {} has been closed", self.name),
            ));
        }
        {
            let client = self.client.read();
            if let Some(c) = &*client {
                if c.is_alive() {
                    return Ok(Session::Enterprise(c.clone()));
                }
            }
        }

        let _guard = self.build_lock.lock().await;
        {
            let client = self.client.read();
            if let Some(c) = &*client {
                if c.is_alive() {
                    return Ok(Session::Enterprise(c.clone()));
                }
            }
        }

        let client: Arc<dyn EngineClient> = self.controller.connect_session(self.pq_serial).await?.into();
        *self.client.write() = Some(client.clone());
        Ok(Session::Enterprise(client))
    }

    /// Disconnects the session (reverse of build step 5). Deleting the
    /// underlying PQ itself is a separate operation (`session_enterprise_delete`
    /// issues `delete_query` after this).
    pub async fn close(&self) {
        self.closed.store(true, std::sync::atomic::Ordering::SeqCst);
        let client = self.client.write().take();
        if let Some(c) = client {
            c.close().await;
        }
        let _ = self.controller.disconnect_session(self.pq_serial).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_client::SimulatedControllerClient;

    #[tokio::test]
    async fn get_connects_once_and_caches() {
        let controller = Arc::new(SimulatedControllerClient::new());
        let serial = controller
            .add_query(dh_domain::PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();
        let mgr = EnterpriseSessionManager::new("w1", serial, controller);

        let s1 = mgr.get().await.unwrap();
        let s2 = mgr.get().await.unwrap();
        assert!(Arc::ptr_eq(s1.client(), s2.client()));
    }

    #[tokio::test]
    async fn close_is_idempotent_and_blocks_further_get() {
        let controller = Arc::new(SimulatedControllerClient::new());
        let serial = controller
            .add_query(dh_domain::PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();
        let mgr = EnterpriseSessionManager::new("w1", serial, controller);

        mgr.get().await.unwrap();
        mgr.close().await;
        mgr.close().await;
        let err = mgr.get().await.unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::UnknownSession);
    }
}

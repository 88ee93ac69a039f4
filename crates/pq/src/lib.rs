//! PQ Subsystem (C8): per-system subscription snapshots plus the
//! create/start/stop/restart/delete orchestration that sits on top of them.

pub mod lifecycle;
pub mod subscription;

use std::collections::HashMap;
use std::sync::Arc;

use dh_domain::{CoreError, ErrorKind, PqCreateParams, PqDescriptor, Result};
use dh_resources::ControllerClient;
use tokio::sync::RwLock as AsyncRwLock;

use subscription::SystemSubscription;

/// One subscription per enterprise system, keyed the same way as the
/// registry's `enterprise_systems` map. Created lazily the first time a PQ
/// operation touches a system, torn down on `reload` along with everything
/// else (§4.8 "at most one active subscription per system").
pub struct PqSubsystem {
    subscriptions: AsyncRwLock<HashMap<String, Arc<SystemSubscription>>>,
}

impl PqSubsystem {
    pub fn new() -> Self {
        Self { subscriptions: AsyncRwLock::new(HashMap::new()) }
    }

    async fn subscription_for(&self, system_key: &str, controller: &Arc<dyn ControllerClient>) -> Arc<SystemSubscription> {
        if let Some(sub) = self.subscriptions.read().await.get(system_key) {
            return sub.clone();
        }
        let mut subs = self.subscriptions.write().await;
        if let Some(sub) = subs.get(system_key) {
            return sub.clone();
        }
        let sub = SystemSubscription::spawn(controller.clone());
        subs.insert(system_key.to_string(), sub.clone());
        sub
    }

    /// `pq_list` (§4.8): reads the cached snapshot, no RPC.
    pub async fn list(&self, system_key: &str, controller: &Arc<dyn ControllerClient>) -> Vec<PqDescriptor> {
        self.subscription_for(system_key, controller).await.snapshot()
    }

    /// `pq_details` (§4.8): cached snapshot lookup by serial.
    pub async fn details(&self, system_key: &str, controller: &Arc<dyn ControllerClient>, serial: i64) -> Result<PqDescriptor> {
        self.subscription_for(system_key, controller)
            .await
            .snapshot()
            .into_iter()
            .find(|d| d.serial == serial)
            .ok_or_else(|| CoreError::new(ErrorKind::UnknownSession, format!("no pq with serial {serial} in system {system_key}")))
    }

    /// `pq_name_to_id` (§4.8): consults the snapshot; on a miss, refreshes
    /// the subscription once before failing.
    pub async fn name_to_id(&self, system_key: &str, controller: &Arc<dyn ControllerClient>, name: &str) -> Result<i64> {
        let sub = self.subscription_for(system_key, controller).await;
        if let Some(pq) = sub.find_by_name(name) {
            return Ok(pq.serial);
        }
        sub.refresh(controller.as_ref()).await?;
        sub.find_by_name(name)
            .map(|pq| pq.serial)
            .ok_or_else(|| CoreError::new(ErrorKind::UnknownSession, format!("no pq named {name:?} in system {system_key}")))
    }

    /// `pq_create`: just the `add_query` half of `pq_start` — callers that
    /// want create-and-wait-for-running use [`Self::start`] with `params`
    /// and no serial.
    pub async fn create(&self, controller: &dyn ControllerClient, params: PqCreateParams) -> Result<i64> {
        controller.add_query(params).await
    }

    pub async fn start(
        &self,
        controller: &dyn ControllerClient,
        serial: Option<i64>,
        params: Option<PqCreateParams>,
        timeout_seconds: Option<f64>,
    ) -> Result<PqDescriptor> {
        lifecycle::start(controller, serial, params, timeout_seconds).await
    }

    pub async fn stop(&self, controller: &dyn ControllerClient, serial: i64, timeout_seconds: Option<f64>) -> Result<()> {
        lifecycle::stop(controller, serial, timeout_seconds).await
    }

    pub async fn restart(&self, controller: &dyn ControllerClient, serial: i64, timeout_seconds: Option<f64>) -> Result<PqDescriptor> {
        lifecycle::restart(controller, serial, timeout_seconds).await
    }

    pub async fn delete(&self, controller: &dyn ControllerClient, serial: i64) -> Result<()> {
        lifecycle::delete(controller, serial).await
    }

    pub async fn modify(&self, controller: &dyn ControllerClient, serial: i64, params: PqCreateParams) -> Result<()> {
        lifecycle::modify(controller, serial, params).await
    }

    /// Drops every cached subscription, aborting their poll tasks (§4.10:
    /// a `reload` tears down everything bound to the old configuration).
    pub async fn close_all(&self) {
        self.subscriptions.write().await.clear();
    }
}

impl Default for PqSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

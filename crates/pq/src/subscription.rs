//! Per-system PQ snapshot subscription (§4.8, §9 design note: "a per-system
//! background task that writes into a snapshot cell readable under a
//! lightweight read-lock").

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dh_domain::PqDescriptor;
use dh_resources::ControllerClient;
use parking_lot::RwLock;
use tokio::task::AbortHandle;

const POLL_INTERVAL_MS: u64 = 500;

/// Holds the latest snapshot for one enterprise system and the background
/// task that keeps it fresh. `pq_list`/`pq_details`/`pq_name_to_id` read the
/// cell directly; they never issue an RPC themselves.
pub struct SystemSubscription {
    snapshot: RwLock<Vec<PqDescriptor>>,
    version: AtomicU64,
    poll_task: AbortHandle,
}

impl SystemSubscription {
    /// Spawns the background poll task, cancelled and awaited (abort is
    /// sufficient here since the task holds no resources besides the
    /// controller `Arc` and the snapshot cell) on `Drop` (§9 design note).
    pub fn spawn(controller: Arc<dyn ControllerClient>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let task_weak = weak.clone();
            let handle = tokio::spawn(async move {
                let mut interval = tokio::time::interval(std::time::Duration::from_millis(POLL_INTERVAL_MS));
                loop {
                    interval.tick().await;
                    let Some(this) = task_weak.upgrade() else { break };
                    if !controller.is_alive() {
                        break;
                    }
                    if controller.refresh_snapshot().await.is_err() {
                        continue;
                    }
                    *this.snapshot.write() = controller.snapshot();
                    this.version.fetch_add(1, Ordering::SeqCst);
                }
            });

            Self {
                snapshot: RwLock::new(Vec::new()),
                version: AtomicU64::new(0),
                poll_task: handle.abort_handle(),
            }
        })
    }

    pub fn snapshot(&self) -> Vec<PqDescriptor> {
        self.snapshot.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn find_by_name(&self, name: &str) -> Option<PqDescriptor> {
        self.snapshot.read().iter().find(|pq| pq.name == name).cloned()
    }

    /// Force a refresh outside the poll cadence — used when a name lookup
    /// misses the cached snapshot (§4.8).
    pub async fn refresh(&self, controller: &dyn ControllerClient) -> dh_domain::Result<()> {
        controller.refresh_snapshot().await?;
        *self.snapshot.write() = controller.snapshot();
        self.version.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for SystemSubscription {
    fn drop(&mut self) {
        self.poll_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_resources::engine_client::SimulatedControllerClient;

    #[tokio::test]
    async fn refresh_pulls_current_controller_state() {
        let controller: Arc<dyn ControllerClient> = Arc::new(SimulatedControllerClient::new());
        let serial = controller
            .add_query(dh_domain::PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();
        let sub = SystemSubscription::spawn(controller.clone());

        sub.refresh(&*controller).await.unwrap();
        assert_eq!(sub.find_by_name("w1").unwrap().serial, serial);
    }

    #[tokio::test]
    async fn background_task_eventually_reflects_new_state() {
        let controller: Arc<dyn ControllerClient> = Arc::new(SimulatedControllerClient::new());
        let sub = SystemSubscription::spawn(controller.clone());
        controller
            .add_query(dh_domain::PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(700)).await;
        assert!(sub.find_by_name("w1").is_some());
    }
}

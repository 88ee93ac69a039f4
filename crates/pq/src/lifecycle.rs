//! PQ create/start/stop/restart/delete orchestration and `wait_for_state`
//! (§4.8 "State-transition waits"). Waits poll `controller.snapshot()`
//! directly rather than the subscription cache, since the cache only
//! refreshes every `POLL_INTERVAL_MS` and a convergence wait needs to react
//! as soon as a transition lands, not on the next tick.

use std::time::Duration;

use dh_domain::config::DEFAULT_PQ_OPERATION_TIMEOUT_SECS;
use dh_domain::{CoreError, ErrorKind, PqCreateParams, PqDescriptor, PqState, Result};
use dh_resources::ControllerClient;

const POLL_INTERVAL_MS: u64 = 100;

fn timeout_duration(timeout_seconds: Option<f64>) -> Duration {
    match timeout_seconds {
        Some(secs) if secs > 0.0 => Duration::from_secs_f64(secs),
        _ => Duration::from_secs(DEFAULT_PQ_OPERATION_TIMEOUT_SECS),
    }
}

/// Polls `controller.snapshot()` until `predicate` matches the PQ's current
/// descriptor, or a terminal/failed state makes the wait unsatisfiable, or
/// `timeout` elapses.
async fn wait_for_state(
    controller: &dyn ControllerClient,
    serial: i64,
    timeout: Duration,
    predicate: impl Fn(&PqDescriptor) -> bool,
    fail_if: impl Fn(&PqDescriptor) -> bool,
) -> Result<PqDescriptor> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(desc) = controller.snapshot().into_iter().find(|d| d.serial == serial) {
            if predicate(&desc) {
                return Ok(desc);
            }
            if fail_if(&desc) {
                return Err(CoreError::new(
                    ErrorKind::RemoteRejected,
                    format!("pq {} ({}) reached state {:?} while waiting", serial, desc.name, desc.state),
                ));
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(CoreError::timeout(format!("timed out waiting for pq {serial} to reach the expected state")));
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

/// `pq_start`: add (if `serial` is `None`) then wait for RUNNING, failing
/// early on FAILED/TERMINATED (§4.8).
pub async fn start(
    controller: &dyn ControllerClient,
    serial: Option<i64>,
    params: Option<PqCreateParams>,
    timeout_seconds: Option<f64>,
) -> Result<PqDescriptor> {
    let timeout = timeout_duration(timeout_seconds);
    let deadline = tokio::time::Instant::now() + timeout;

    let serial = match serial {
        Some(s) => s,
        None => {
            let params = params.ok_or_else(|| {
                CoreError::invalid_argument("pq_start: either serial or create parameters are required")
            })?;
            controller.add_query(params).await?
        }
    };
    controller.start_query(serial).await?;

    let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
    wait_for_state(
        controller,
        serial,
        remaining,
        |d| d.state == PqState::Running,
        |d| matches!(d.state, PqState::Failed | PqState::Terminated),
    )
    .await
}

/// `pq_stop`: request stop, then wait until terminal or the PQ disappears
/// from the snapshot entirely (§4.8). Disappearance counts as success: the
/// engine may retire a stopped PQ's bookkeeping immediately.
pub async fn stop(controller: &dyn ControllerClient, serial: i64, timeout_seconds: Option<f64>) -> Result<()> {
    let timeout = timeout_duration(timeout_seconds);
    controller.stop_query(serial).await?;

    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match controller.snapshot().into_iter().find(|d| d.serial == serial) {
            None => return Ok(()),
            Some(d) if d.state.is_terminal() => return Ok(()),
            Some(_) => {}
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(CoreError::timeout(format!("timed out waiting for pq {serial} to stop")));
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

/// `pq_restart`: stop, wait terminal, start, wait running — one timeout
/// budget spans the whole sequence (§4.8).
pub async fn restart(controller: &dyn ControllerClient, serial: i64, timeout_seconds: Option<f64>) -> Result<PqDescriptor> {
    let timeout = timeout_duration(timeout_seconds);
    let deadline = tokio::time::Instant::now() + timeout;

    stop(controller, serial, Some(timeout.as_secs_f64())).await?;

    let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
    if remaining.is_zero() {
        return Err(CoreError::timeout(format!("timed out waiting for pq {serial} to restart")));
    }
    start(controller, Some(serial), None, Some(remaining.as_secs_f64())).await
}

/// `pq_delete`: idempotent by effect — deleting a missing PQ is success, not
/// `UnknownSession` (§4.8 "idempotent by effect").
pub async fn delete(controller: &dyn ControllerClient, serial: i64) -> Result<()> {
    controller.delete_query(serial).await
}

/// `pq_modify`: applies new creation parameters in place, leaving the PQ's
/// running state untouched.
pub async fn modify(controller: &dyn ControllerClient, serial: i64, params: PqCreateParams) -> Result<()> {
    controller.modify_query(serial, params).await
}

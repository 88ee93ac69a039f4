//! The engine/controller client contracts. The wire protocols themselves
//! are external client libraries per scope — this module only defines the
//! seam the managers build against, plus a simulated implementation used
//! wherever no live engine is reachable (tests, and a target for future
//! real client adapters to slot into).

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dh_domain::{CellValue, ColumnDef, CoreError, PqCreateParams, PqDescriptor, Result, TableResult};
use tokio::sync::Mutex;

/// A live connection to one engine worker, community or enterprise.
#[async_trait]
pub trait EngineClient: Send + Sync {
    fn is_alive(&self) -> bool;
    async fn list_tables(&self) -> Result<Vec<String>>;
    async fn table_schema(&self, table: &str) -> Result<Vec<ColumnDef>>;
    /// Declared row count, without fetching any rows — lets `session_table_data`
    /// apply the pre-fetch size-guard estimate before issuing the real fetch
    /// (§4.9, scenario S4).
    async fn table_row_count_estimate(&self, table: &str) -> Result<usize>;
    async fn table_data(&self, table: &str, max_rows: Option<usize>) -> Result<TableResult>;
    async fn run_script(&self, script: &str) -> Result<TableResult>;
    async fn pip_list(&self) -> Result<Vec<String>>;
    /// Catalog browsing (§4.7 "Catalog"), meaningful only for enterprise
    /// sessions — handlers gate on [`crate::session::Session::supports_catalog`]
    /// before ever reaching these, so community's implementation is never
    /// exercised in practice but still needs to exist to satisfy the trait.
    async fn catalog_namespaces(&self) -> Result<Vec<String>>;
    async fn catalog_tables(&self, namespace: &str) -> Result<Vec<String>>;
    async fn catalog_table_schema(&self, namespace: &str, table: &str) -> Result<Vec<ColumnDef>>;
    async fn catalog_table_sample(&self, namespace: &str, table: &str, max_rows: usize) -> Result<TableResult>;
    async fn close(&self);
}

/// The long-lived authenticated connection to an enterprise controller
/// (§4.4), transporting PQ state updates and minting worker sessions.
#[async_trait]
pub trait ControllerClient: Send + Sync {
    fn is_alive(&self) -> bool;
    async fn handshake(&self, timeout: Duration) -> Result<()>;
    async fn add_query(&self, params: PqCreateParams) -> Result<i64>;
    /// `pq_modify`: apply new creation parameters to an existing PQ without
    /// touching its running state.
    async fn modify_query(&self, serial: i64, params: PqCreateParams) -> Result<()>;
    async fn delete_query(&self, serial: i64) -> Result<()>;
    async fn start_query(&self, serial: i64) -> Result<()>;
    async fn stop_query(&self, serial: i64) -> Result<()>;
    async fn connect_session(&self, serial: i64) -> Result<Box<dyn EngineClient>>;
    async fn disconnect_session(&self, serial: i64) -> Result<()>;
    /// Current PQ map, as of the last subscription update.
    fn snapshot(&self) -> Vec<PqDescriptor>;
    /// Force a subscription refresh; used when a name lookup misses the
    /// cached snapshot (§4.8 `pq_name_to_id`).
    async fn refresh_snapshot(&self) -> Result<()>;
    async fn close(&self);
}

// ───────────────────────────── Simulated engine client ─────────────────────────────

/// A connect-count hook shared with test code so build-coalescing
/// (testable property 1, scenario S3) can be asserted without real I/O.
#[derive(Debug, Default, Clone)]
pub struct ConnectCounter(Arc<AtomicUsize>);

impl ConnectCounter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fake engine worker connection: serializes calls behind one mutex the
/// way [`crate::auth`]'s real counterparts would serialize RPC cycles, and
/// tracks liveness via an `AtomicBool` that tests can flip to force a
/// rebuild on the next `get()`.
pub struct SimulatedEngineClient {
    alive: AtomicBool,
    call_lock: Mutex<()>,
    tables: std::collections::HashMap<String, (Vec<ColumnDef>, usize)>,
}

impl SimulatedEngineClient {
    pub fn connect(counter: &ConnectCounter) -> Self {
        counter.increment();
        Self {
            alive: AtomicBool::new(true),
            call_lock: Mutex::new(()),
            tables: std::collections::HashMap::new(),
        }
    }

    /// Register a fake table so `list_tables`/`table_schema`/`table_data`
    /// have something to return in tests.
    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<ColumnDef>, row_count: usize) -> Self {
        self.tables.insert(name.into(), (columns, row_count));
        self
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineClient for SimulatedEngineClient {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let _guard = self.call_lock.lock().await;
        if !self.is_alive() {
            return Err(CoreError::remote_unavailable("engine connection is closed"));
        }
        Ok(self.tables.keys().cloned().collect())
    }

    async fn table_schema(&self, table: &str) -> Result<Vec<ColumnDef>> {
        let _guard = self.call_lock.lock().await;
        self.tables
            .get(table)
            .map(|(cols, _)| cols.clone())
            .ok_or_else(|| CoreError::invalid_argument(format!("no such table: {table}")))
    }

    async fn table_row_count_estimate(&self, table: &str) -> Result<usize> {
        let _guard = self.call_lock.lock().await;
        self.tables
            .get(table)
            .map(|(_, rows)| *rows)
            .ok_or_else(|| CoreError::invalid_argument(format!("no such table: {table}")))
    }

    async fn table_data(&self, table: &str, max_rows: Option<usize>) -> Result<TableResult> {
        let _guard = self.call_lock.lock().await;
        let (columns, declared_rows) = self
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| CoreError::invalid_argument(format!("no such table: {table}")))?;
        let effective_rows = max_rows.map(|m| m.min(declared_rows)).unwrap_or(declared_rows);
        let rows = (0..effective_rows)
            .map(|i| {
                columns
                    .iter()
                    .map(|_| CellValue::Int(i as i64))
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(TableResult {
            columns,
            rows,
            is_complete: effective_rows == declared_rows,
        })
    }

    async fn run_script(&self, _script: &str) -> Result<TableResult> {
        let _guard = self.call_lock.lock().await;
        Ok(TableResult { columns: vec![], rows: vec![], is_complete: true })
    }

    async fn pip_list(&self) -> Result<Vec<String>> {
        let _guard = self.call_lock.lock().await;
        Ok(vec![])
    }

    /// A single implicit `"default"` namespace holding every registered
    /// table; real catalogs (Iceberg, etc.) expose many.
    async fn catalog_namespaces(&self) -> Result<Vec<String>> {
        let _guard = self.call_lock.lock().await;
        Ok(vec!["default".into()])
    }

    async fn catalog_tables(&self, namespace: &str) -> Result<Vec<String>> {
        let _guard = self.call_lock.lock().await;
        if namespace != "default" {
            return Ok(vec![]);
        }
        Ok(self.tables.keys().cloned().collect())
    }

    async fn catalog_table_schema(&self, namespace: &str, table: &str) -> Result<Vec<ColumnDef>> {
        drop(self.call_lock.lock().await);
        if namespace != "default" {
            return Err(CoreError::invalid_argument(format!("no such namespace: {namespace}")));
        }
        self.table_schema(table).await
    }

    async fn catalog_table_sample(&self, namespace: &str, table: &str, max_rows: usize) -> Result<TableResult> {
        drop(self.call_lock.lock().await);
        if namespace != "default" {
            return Err(CoreError::invalid_argument(format!("no such namespace: {namespace}")));
        }
        self.table_data(table, Some(max_rows)).await
    }

    async fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

// ───────────────────────────── Simulated controller client ─────────────────────────────

/// A fake controller: maintains an in-memory PQ map, assigns incrementing
/// serials, and transitions PQ state synchronously so tests don't need a
/// real controller RPC surface to exercise §4.8 semantics.
pub struct SimulatedControllerClient {
    alive: AtomicBool,
    next_serial: AtomicUsize,
    pqs: parking_lot::RwLock<std::collections::HashMap<i64, PqDescriptor>>,
    /// Serials pinned by `force_state` — `start_query`/`stop_query` leave
    /// them alone, letting tests hold a PQ in an arbitrary state to exercise
    /// `wait_for_state` convergence and timeout paths deterministically.
    pinned: parking_lot::RwLock<std::collections::HashSet<i64>>,
    engine_counter: ConnectCounter,
}

impl SimulatedControllerClient {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            next_serial: AtomicUsize::new(1),
            pqs: parking_lot::RwLock::new(std::collections::HashMap::new()),
            pinned: parking_lot::RwLock::new(std::collections::HashSet::new()),
            engine_counter: ConnectCounter::new(),
        }
    }

    /// Test hook: advance a PQ directly to a given state and pin it there,
    /// bypassing the normal start/stop RPCs.
    pub fn force_state(&self, serial: i64, state: dh_domain::PqState) {
        if let Some(pq) = self.pqs.write().get_mut(&serial) {
            pq.state = state;
        }
        self.pinned.write().insert(serial);
    }
}

impl Default for SimulatedControllerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControllerClient for SimulatedControllerClient {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn handshake(&self, _timeout: Duration) -> Result<()> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(CoreError::remote_unavailable("controller connection is closed"))
        }
    }

    async fn add_query(&self, params: PqCreateParams) -> Result<i64> {
        let serial = self.next_serial.fetch_add(1, Ordering::SeqCst) as i64;
        let descriptor = PqDescriptor::new(serial, &params);
        self.pqs.write().insert(serial, descriptor);
        Ok(serial)
    }

    async fn modify_query(&self, serial: i64, params: PqCreateParams) -> Result<()> {
        let mut pqs = self.pqs.write();
        let pq = pqs
            .get_mut(&serial)
            .ok_or_else(|| CoreError::unknown_session("controller", &serial.to_string()))?;
        pq.heap_gb = params.heap_size_gb;
        pq.language = params.programming_language;
        pq.jvm_args = params.extra_jvm_args;
        pq.env_vars = params.extra_environment_vars;
        pq.admin_groups = params.admin_groups;
        pq.viewer_groups = params.viewer_groups;
        pq.auto_delete_timeout = params.auto_delete_timeout;
        Ok(())
    }

    async fn delete_query(&self, serial: i64) -> Result<()> {
        // Idempotent by effect (§4.8): deleting a missing PQ still succeeds.
        self.pqs.write().remove(&serial);
        Ok(())
    }

    async fn start_query(&self, serial: i64) -> Result<()> {
        if self.pinned.read().contains(&serial) {
            return Ok(());
        }
        let mut pqs = self.pqs.write();
        let pq = pqs
            .get_mut(&serial)
            .ok_or_else(|| CoreError::unknown_session("controller", &serial.to_string()))?;
        // A real controller rejects starting a query that already failed or
        // was torn down; the caller observes this through the snapshot
        // rather than a start_query error, matching the wait-based contract.
        if !matches!(pq.state, dh_domain::PqState::Failed | dh_domain::PqState::Terminated) {
            pq.state = dh_domain::PqState::Running;
        }
        Ok(())
    }

    async fn stop_query(&self, serial: i64) -> Result<()> {
        if self.pinned.read().contains(&serial) {
            return Ok(());
        }
        let mut pqs = self.pqs.write();
        let pq = pqs
            .get_mut(&serial)
            .ok_or_else(|| CoreError::unknown_session("controller", &serial.to_string()))?;
        pq.state = dh_domain::PqState::Stopped;
        Ok(())
    }

    async fn connect_session(&self, serial: i64) -> Result<Box<dyn EngineClient>> {
        if !self.pqs.read().contains_key(&serial) {
            return Err(CoreError::unknown_session("controller", &serial.to_string()));
        }
        Ok(Box::new(SimulatedEngineClient::connect(&self.engine_counter)))
    }

    async fn disconnect_session(&self, _serial: i64) -> Result<()> {
        Ok(())
    }

    fn snapshot(&self) -> Vec<PqDescriptor> {
        self.pqs.read().values().cloned().collect()
    }

    async fn refresh_snapshot(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_increments_shared_counter() {
        let counter = ConnectCounter::new();
        let _c1 = SimulatedEngineClient::connect(&counter);
        let _c2 = SimulatedEngineClient::connect(&counter);
        assert_eq!(counter.count(), 2);
    }

    #[tokio::test]
    async fn killed_client_reports_dead_and_rejects_calls() {
        let counter = ConnectCounter::new();
        let client = SimulatedEngineClient::connect(&counter);
        client.kill();
        assert!(!client.is_alive());
        let err = client.list_tables().await.unwrap_err();
        assert_eq!(err.kind, dh_domain::ErrorKind::RemoteUnavailable);
    }

    #[tokio::test]
    async fn catalog_browsing_covers_the_same_registered_tables() {
        let counter = ConnectCounter::new();
        let client = SimulatedEngineClient::connect(&counter)
            .with_table("t", vec![ColumnDef { name: "a".into(), type_name: "int".into() }], 5);
        let namespaces = client.catalog_namespaces().await.unwrap();
        assert_eq!(namespaces, vec!["default".to_string()]);
        assert_eq!(client.catalog_tables("default").await.unwrap(), vec!["t".to_string()]);
        assert!(client.catalog_table_schema("other", "t").await.is_err());
        let sample = client.catalog_table_sample("default", "t", 2).await.unwrap();
        assert_eq!(sample.row_count(), 2);
    }

    #[tokio::test]
    async fn table_data_respects_max_rows_and_marks_incomplete() {
        let counter = ConnectCounter::new();
        let client = SimulatedEngineClient::connect(&counter).with_table(
            "t",
            vec![ColumnDef { name: "a".into(), type_name: "int".into() }],
            100,
        );
        let result = client.table_data("t", Some(10)).await.unwrap();
        assert_eq!(result.row_count(), 10);
        assert!(!result.is_complete);
    }

    #[tokio::test]
    async fn controller_add_start_stop_delete_round_trip() {
        let controller = SimulatedControllerClient::new();
        let serial = controller
            .add_query(PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();
        controller.start_query(serial).await.unwrap();
        assert!(controller.snapshot().iter().any(|pq| pq.state.is_running()));

        controller.stop_query(serial).await.unwrap();
        assert!(controller.snapshot().iter().any(|pq| pq.state.is_terminal()));

        controller.delete_query(serial).await.unwrap();
        assert!(controller.snapshot().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_missing_pq_is_idempotent() {
        let controller = SimulatedControllerClient::new();
        controller.delete_query(999).await.unwrap();
    }

    #[tokio::test]
    async fn modify_query_updates_fields_without_touching_state() {
        let controller = SimulatedControllerClient::new();
        let serial = controller
            .add_query(PqCreateParams { name: "w1".into(), ..Default::default() })
            .await
            .unwrap();
        controller.start_query(serial).await.unwrap();

        controller
            .modify_query(serial, PqCreateParams { name: "w1".into(), heap_size_gb: Some(8.0), ..Default::default() })
            .await
            .unwrap();

        let pq = controller.snapshot().into_iter().find(|p| p.serial == serial).unwrap();
        assert_eq!(pq.heap_gb, Some(8.0));
        assert!(pq.state.is_running());
    }
}

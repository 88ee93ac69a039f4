use serde::Serialize;

/// Structured trace events emitted across the core crates.
///
/// Every variant that could plausibly carry credential material
/// (`ConfigLoaded`) only ever carries counts and env-var *names*, never
/// resolved values — see §3 config redaction invariant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ConfigLoaded {
        community_sessions: usize,
        enterprise_systems: usize,
        warnings: usize,
    },
    ManagerBuildStarted {
        session_id: String,
    },
    ManagerBuildCoalesced {
        session_id: String,
    },
    ManagerReady {
        session_id: String,
    },
    ManagerFailed {
        session_id: String,
        error_kind: String,
    },
    ManagerClosed {
        session_id: String,
    },
    RegistryReloadStarted,
    RegistryReloadCompleted {
        community_sessions: usize,
        enterprise_systems: usize,
        managers_closed: usize,
    },
    PqStateChanged {
        system_key: String,
        serial: i64,
        name: String,
        state: String,
    },
    ToolInvoked {
        tool_name: String,
        success: bool,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "core_event");
    }
}

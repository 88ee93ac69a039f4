//! Shared PQ (persistent query) descriptor and creation-parameter types
//! (§3 "PQ descriptor", §4.8). Kept in `dh-domain` because both the
//! enterprise system manager (owner of the controller client) and the PQ
//! subsystem (consumer of it) need the same vocabulary without a
//! circular crate dependency between them.

use serde::{Deserialize, Serialize};

use crate::config::SessionLanguage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PqState {
    Pending,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Failed,
    Terminated,
}

impl PqState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PqState::Stopped | PqState::Failed | PqState::Terminated)
    }

    pub fn is_running(self) -> bool {
        matches!(self, PqState::Running)
    }
}

/// Effective, fully-resolved parameters for minting a PQ (§4.1
/// `session_creation.defaults`, resolved per the
/// `tool_parameter > system defaults > engine API default` order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PqCreateParams {
    pub name: String,
    pub heap_size_gb: Option<f64>,
    pub programming_language: Option<SessionLanguage>,
    pub auto_delete_timeout: Option<u64>,
    pub server: Option<String>,
    pub engine: Option<String>,
    pub extra_jvm_args: Vec<String>,
    pub extra_environment_vars: Vec<String>,
    pub admin_groups: Vec<String>,
    pub viewer_groups: Vec<String>,
    pub timeout_seconds: Option<f64>,
    pub session_arguments: serde_json::Map<String, serde_json::Value>,
}

/// A named, controller-managed worker specification with its own lifecycle
/// (§3 "PQ descriptor").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PqDescriptor {
    pub serial: i64,
    pub name: String,
    pub state: PqState,
    pub heap_gb: Option<f64>,
    pub language: Option<SessionLanguage>,
    pub jvm_args: Vec<String>,
    pub env_vars: Vec<String>,
    pub admin_groups: Vec<String>,
    pub viewer_groups: Vec<String>,
    pub auto_delete_timeout: Option<u64>,
}

impl PqDescriptor {
    pub fn new(serial: i64, params: &PqCreateParams) -> Self {
        Self {
            serial,
            name: params.name.clone(),
            state: PqState::Pending,
            heap_gb: params.heap_size_gb,
            language: params.programming_language,
            jvm_args: params.extra_jvm_args.clone(),
            env_vars: params.extra_environment_vars.clone(),
            admin_groups: params.admin_groups.clone(),
            viewer_groups: params.viewer_groups.clone(),
            auto_delete_timeout: params.auto_delete_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(PqState::Stopped.is_terminal());
        assert!(PqState::Failed.is_terminal());
        assert!(PqState::Terminated.is_terminal());
        assert!(!PqState::Running.is_terminal());
        assert!(!PqState::Pending.is_terminal());
    }
}

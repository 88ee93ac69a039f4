//! Configuration document model (§3, §4.1).
//!
//! `Config` is the parsed, structurally-validated shape of the JSON
//! configuration document. Parsing is strict: unknown top-level fields are
//! rejected (`deny_unknown_fields`), matching the "unrecognized configuration
//! keys are a hard error" invariant. Field-level structural checks (absolute
//! paths, at-most-one-credential, NAME=value pairs) run separately via
//! [`Config::validate`] and produce [`ConfigIssue`]s rather than failing
//! parse, so that warnings (e.g. ignored sibling fields) can be surfaced
//! alongside errors instead of aborting on the first one.

mod community;
mod credential;
mod enterprise;
mod store;

pub use community::{CommunityConfig, CommunitySessionConfig, SessionLanguage};
pub use credential::CredentialRef;
pub use enterprise::{
    EnterpriseAuthType, EnterpriseConfig, EnterpriseSystemConfig, SessionCreationConfig,
    SessionCreationDefaults,
};
pub use store::{ConfigStore, CONFIG_PATH_ENV_VAR};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Response size ceiling enforced by the format/size-guard subsystem (§4.9).
pub const MAX_RESPONSE_BYTES: usize = 50 * 1024 * 1024;

/// Default wall-clock budget for building a session or system manager (§5).
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 30;

/// Default wall-clock budget for the enterprise controller handshake (§4.4).
pub const DEFAULT_CONTROLLER_HANDSHAKE_TIMEOUT_SECS: u64 = 60;

/// Default wall-clock budget for PQ start/stop/restart operations (§4.8),
/// overridable per-system via `session_creation.defaults.timeout_seconds`.
pub const DEFAULT_PQ_OPERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

/// A single diagnostic produced while validating a [`Config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(severity: ConfigSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ConfigSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ConfigSeverity::Warning, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == ConfigSeverity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Warning => "warning",
            ConfigSeverity::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

/// The parsed configuration document (§3 "Configuration Document").
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub community: CommunityConfig,
    #[serde(default)]
    pub enterprise: EnterpriseConfig,
}

impl Config {
    /// Parse a raw JSON document. Fails closed: any unknown field or type
    /// mismatch is `ErrorKind::ConfigInvalid`, never silently ignored.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::config_invalid(format!("failed to parse configuration: {e}")))
    }

    /// Run structural validation across every configured session/system,
    /// collecting all issues rather than stopping at the first one.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (key, session) in &self.community.sessions {
            issues.extend(session.validate(key));
        }
        for (key, system) in &self.enterprise.systems {
            issues.extend(system.validate(key));
        }
        issues
    }

    /// `true` if no configured session or system is completely duplicated
    /// between `community` and `enterprise` namespaces (§3 Session Id
    /// namespacing: `community:` and `enterprise:` keys never collide by
    /// construction, since the kind tag is part of the id).
    pub fn errors(&self) -> Vec<ConfigIssue> {
        self.validate().into_iter().filter(|i| i.is_error()).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

//! Shared error taxonomy used across every core crate.
//!
//! `ErrorKind` mirrors the taxonomy table in the design: handlers match on
//! `kind()` rather than on message text, and the uniform tool envelope
//! converter (in `dh-tools`) only ever needs this one type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigInvalid,
    ConfigMissing,
    UnknownSource,
    UnknownSession,
    AuthResolution,
    RemoteUnavailable,
    RemoteRejected,
    Timeout,
    ResponseTooLarge,
    InvalidArgument,
    Unsupported,
    Cancelled,
    Internal,
}

impl ErrorKind {
    /// Whether a manager observing this error kind should transition to `FAILED`.
    pub fn taints_manager(self) -> bool {
        matches!(self, ErrorKind::RemoteUnavailable)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigMissing, message)
    }

    pub fn unknown_source(key: &str) -> Self {
        Self::new(ErrorKind::UnknownSource, format!("unknown source: {key}"))
    }

    pub fn unknown_session(system: &str, name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownSession,
            format!("unknown session: {system}:{name}"),
        )
    }

    pub fn auth_resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthResolution, message)
    }

    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteUnavailable, message)
    }

    pub fn remote_rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteRejected, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn response_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseTooLarge, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::internal(format!("io: {e}"))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::internal(format!("json: {e}"))
    }
}

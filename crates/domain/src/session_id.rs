//! Canonical session id grammar: `{kind}:{source}:{name}`.
//!
//! Ids are opaque to callers but stably parseable by the core — every id
//! handed out by the registry round-trips through [`SessionId::parse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Community,
    Enterprise,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Community => write!(f, "community"),
            SessionKind::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    pub kind: SessionKind,
    pub source: String,
    pub name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session id must have exactly three colon-separated components: {0}")]
    WrongShape(String),
    #[error("unknown session kind {0:?}, expected \"community\" or \"enterprise\"")]
    UnknownKind(String),
    #[error("session id components may not themselves contain colons: {0}")]
    EmbeddedColon(String),
}

impl SessionId {
    pub fn new(kind: SessionKind, source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            name: name.into(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SessionIdError> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 3 {
            return Err(SessionIdError::WrongShape(raw.to_string()));
        }
        let [kind, source, name] = [parts[0], parts[1], parts[2]];
        let kind = match kind {
            "community" => SessionKind::Community,
            "enterprise" => SessionKind::Enterprise,
            other => return Err(SessionIdError::UnknownKind(other.to_string())),
        };
        if source.is_empty() || name.is_empty() {
            return Err(SessionIdError::WrongShape(raw.to_string()));
        }
        Ok(Self {
            kind,
            source: source.to_string(),
            name: name.to_string(),
        })
    }

    /// Validate a raw key/name component doesn't embed the `:` separator.
    pub fn validate_component(component: &str) -> Result<(), SessionIdError> {
        if component.contains(':') {
            return Err(SessionIdError::EmbeddedColon(component.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.source, self.name)
    }
}

impl FromStr for SessionId {
    type Err = SessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionId::parse(s)
    }
}

//! The tagged session variant callers actually hold (§9 design note:
//! "replace dynamic introspection with a small capability trait per
//! session kind, matched by tagged variant").

use std::sync::Arc;

use dh_domain::{capability, SessionKind};

use crate::engine_client::EngineClient;

/// A live, kind-tagged handle to an engine worker. Catalog handlers match
/// on the variant directly rather than probing attributes at runtime.
#[derive(Clone)]
pub enum Session {
    Community(Arc<dyn EngineClient>),
    Enterprise(Arc<dyn EngineClient>),
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::Community(_) => f.write_str("Session::Community(..)"),
            Session::Enterprise(_) => f.write_str("Session::Enterprise(..)"),
        }
    }
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Community(_) => SessionKind::Community,
            Session::Enterprise(_) => SessionKind::Enterprise,
        }
    }

    pub fn client(&self) -> &Arc<dyn EngineClient> {
        match self {
            Session::Community(c) | Session::Enterprise(c) => c,
        }
    }

    pub fn supports_catalog(&self) -> bool {
        capability::supports_catalog(self.kind())
    }

    pub fn supports_scripts(&self) -> bool {
        capability::supports_scripts(self.kind())
    }

    pub fn is_alive(&self) -> bool {
        self.client().is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_client::{ConnectCounter, SimulatedEngineClient};

    #[test]
    fn community_session_does_not_support_catalog() {
        let counter = ConnectCounter::new();
        let session = Session::Community(Arc::new(SimulatedEngineClient::connect(&counter)));
        assert!(!session.supports_catalog());
        assert!(session.supports_scripts());
    }

    #[test]
    fn enterprise_session_supports_catalog() {
        let counter = ConnectCounter::new();
        let session = Session::Enterprise(Arc::new(SimulatedEngineClient::connect(&counter)));
        assert!(session.supports_catalog());
    }
}

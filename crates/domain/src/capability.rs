//! Capability markers for the two session kinds.
//!
//! Catalog operations only make sense against a controller-brokered
//! enterprise session; community sessions are direct connections with no
//! catalog/namespace concept. Rather than probing a session's kind with
//! string comparisons at every call site, handlers ask the session whether
//! it supports a capability.

use crate::session_id::SessionKind;

/// Whether a session kind supports catalog/namespace browsing (enterprise only).
pub fn supports_catalog(kind: SessionKind) -> bool {
    matches!(kind, SessionKind::Enterprise)
}

/// Whether a session kind supports ad-hoc script execution.
/// Both kinds support this — community sessions run scripts directly,
/// enterprise sessions run them against their bound PQ worker.
pub fn supports_scripts(_kind: SessionKind) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_enterprise_supports_catalog() {
        assert!(!supports_catalog(SessionKind::Community));
        assert!(supports_catalog(SessionKind::Enterprise));
    }

    #[test]
    fn both_kinds_support_scripts() {
        assert!(supports_scripts(SessionKind::Community));
        assert!(supports_scripts(SessionKind::Enterprise));
    }
}

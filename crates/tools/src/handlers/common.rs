//! Shared helpers used by more than one handler theme.

use dh_domain::{CoreError, Result, SessionId, SessionKind};
use dh_resources::Session;

use crate::context::RequestContext;

pub fn parse_session_id(raw: &str) -> Result<SessionId> {
    SessionId::parse(raw).map_err(|e| CoreError::invalid_argument(e.to_string()))
}

/// Resolves a session id to a live [`Session`], building the underlying
/// manager if necessary (§4.6 lookup delegation).
pub async fn resolve_session(ctx: &RequestContext, session_id: &str) -> Result<Session> {
    let id = parse_session_id(session_id)?;
    match id.kind {
        SessionKind::Community => {
            let manager = ctx.registry.community(&id.source).await?;
            manager.get().await
        }
        SessionKind::Enterprise => {
            let manager = ctx.registry.enterprise_session(&id.source, &id.name).await?;
            manager.get().await
        }
    }
}

/// Like [`resolve_session`] but fails `Unsupported` unless the resolved
/// session is enterprise-kind (§4.7 "Catalog operations require … fail
/// Unsupported").
pub async fn resolve_enterprise_session(ctx: &RequestContext, session_id: &str) -> Result<Session> {
    let session = resolve_session(ctx, session_id).await?;
    if !session.supports_catalog() {
        return Err(CoreError::unsupported(format!(
            "session {session_id} is a community session; catalog operations require an enterprise session"
        )));
    }
    Ok(session)
}

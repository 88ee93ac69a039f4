//! `dh-resources` — the Resource Manager core: credential resolution,
//! community and enterprise manager lifecycles, and the keyed registry
//! that owns them (components C2-C6).

pub mod auth;
pub mod community;
pub mod engine_client;
pub mod enterprise_session;
pub mod enterprise_system;
pub mod registry;
pub mod session;

pub use engine_client::{ControllerClient, EngineClient};
pub use registry::ResourceRegistry;
pub use session::Session;

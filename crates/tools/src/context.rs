//! Request context (§4.10 C10 "bind into every request context"):
//! everything a handler needs, cheap to clone per call.

use std::sync::Arc;

use dh_domain::config::ConfigStore;
use dh_pq::PqSubsystem;
use dh_resources::ResourceRegistry;

#[derive(Clone)]
pub struct RequestContext {
    pub config: Arc<ConfigStore>,
    pub registry: Arc<ResourceRegistry>,
    pub pq: Arc<PqSubsystem>,
}

impl RequestContext {
    pub fn new(config: Arc<ConfigStore>, registry: Arc<ResourceRegistry>, pq: Arc<PqSubsystem>) -> Self {
        Self { config, registry, pq }
    }
}

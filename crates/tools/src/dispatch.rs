//! Tool Dispatcher (C7): name → handler lookup, built once at startup
//! (§4.7 SUPPLEMENT), grounded in the teacher's by-name dispatch pattern.

use std::collections::HashMap;

use async_trait::async_trait;
use dh_domain::{CoreError, ErrorKind, ToolCall, ToolEnvelope};
use serde_json::Value;

use crate::context::RequestContext;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope;
}

pub struct Dispatcher {
    handlers: HashMap<&'static str, Box<dyn ToolHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn register(&mut self, handler: Box<dyn ToolHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Never raises through the tool boundary (§4.7): an unknown tool name
    /// is an ordinary `InvalidArgument` failure, not a panic.
    pub async fn dispatch(&self, ctx: &RequestContext, call: ToolCall) -> ToolEnvelope {
        let started = std::time::Instant::now();
        let tool_name = call.tool_name.clone();
        let envelope = match self.handlers.get(call.tool_name.as_str()) {
            Some(handler) => handler.call(ctx, call.arguments).await,
            None => ToolEnvelope::err(CoreError::new(
                ErrorKind::InvalidArgument,
                format!("unknown tool: {}", call.tool_name),
            )),
        };
        dh_domain::trace::TraceEvent::ToolInvoked {
            tool_name,
            success: envelope.is_success(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();
        envelope
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the full dispatcher with every handler from every theme
/// registered (§4.7's handler table).
pub fn build_dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    crate::handlers::register_all(&mut dispatcher);
    dispatcher
}

//! Dispatcher - one named tool call from request to Outcome.
//!
//! ```text
//! RECEIVED -> RESOLVED | UNRESOLVED
//!          -> VALIDATED | REJECTED
//!          -> EXECUTING -> COMPLETED | FAILED
//! ```
//!
//! Every branch ends in a [`CallToolResult`]. The handler runs in its own
//! tokio task, so a panic inside it is observed as a `JoinError` and reported
//! as an error Outcome instead of tearing down the connection.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::envelope;
use super::error::{ToolError, ValidationError};
use super::registry::ToolRegistry;
use super::validator;

/// Routes tool calls through the registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch a call whose arguments arrived as an arbitrary JSON value.
    ///
    /// A missing or `null` payload counts as `{}`; anything else that is not
    /// an object is rejected without invoking a handler.
    pub async fn dispatch_value(&self, name: &str, arguments: Value) -> CallToolResult {
        match arguments {
            Value::Object(map) => self.dispatch(name, Some(map)).await,
            Value::Null => self.dispatch(name, None).await,
            _ => {
                if self.registry.get(name).is_none() {
                    return self.unresolved(name);
                }
                warn!("Rejected call to '{}': arguments are not an object", name);
                envelope::from_error(&ToolError::from(ValidationError::NotAnObject))
            }
        }
    }

    /// Dispatch one call.
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let Some(definition) = self.registry.get(name) else {
            return self.unresolved(name);
        };

        let args = match validator::validate(&definition.schema, arguments.unwrap_or_default()) {
            Ok(args) => args,
            Err(e) => {
                warn!("Rejected call to '{}': {}", name, e);
                return envelope::from_error(&ToolError::from(e));
            }
        };

        let handler = definition.handler.clone();
        let started = Instant::now();
        let outcome = match tokio::spawn(async move { handler.call(args).await }).await {
            Ok(result) => envelope::from_handler(result),
            Err(join_error) => {
                let message = if join_error.is_panic() {
                    panic_message(join_error.into_panic())
                } else {
                    join_error.to_string()
                };
                warn!("Tool '{}' crashed: {}", name, message);
                envelope::from_error(&ToolError::fault(message))
            }
        };

        let elapsed_ms = started.elapsed().as_millis();
        if envelope::is_error(&outcome) {
            warn!(
                "Tool '{}' failed after {}ms: {}",
                name,
                elapsed_ms,
                envelope::text_of(&outcome)
            );
        } else {
            info!("Tool '{}' completed in {}ms", name, elapsed_ms);
        }
        outcome
    }

    fn unresolved(&self, name: &str) -> CallToolResult {
        warn!("Unknown tool requested: {}", name);
        envelope::from_error(&ToolError::unknown_tool(name))
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

//! Tool Registry - central registration for all tools.
//!
//! This module provides:
//! - The name → [`ToolDefinition`] mapping
//! - The startup bootstrap that runs every registration function
//! - Tool metadata for `tools/list`
//!
//! The registry is filled once at startup and then shared read-only behind an
//! `Arc`; there is no hot reload.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use rmcp::model::Tool;
use tracing::{debug, info, warn};

use super::context::ToolContext;
use super::dispatcher::panic_message;
use super::handlers::ToolDefinition;

/// A registration function: builds one tool from the shared context.
pub type Registration = fn(&ToolContext) -> ToolDefinition;

/// Summary of a bootstrap run.
#[derive(Debug, Default, Clone)]
pub struct BootstrapReport {
    /// Names registered, in registration order.
    pub registered: Vec<String>,

    /// One entry per skipped registration.
    pub diagnostics: Vec<String>,
}

/// Tool registry - manages all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry populated from `registrations`.
    pub fn bootstrapped(registrations: &[Registration], ctx: &ToolContext) -> Self {
        let mut registry = Self::new();
        registry.bootstrap(registrations, ctx);
        registry
    }

    /// Insert or overwrite the entry for `definition.name`.
    ///
    /// Returns the definition that was replaced, if any. Overwriting is
    /// allowed (last registration wins) but logged.
    pub fn register(&mut self, definition: ToolDefinition) -> Option<ToolDefinition> {
        let name = definition.name.clone();
        let previous = self.tools.insert(name.clone(), definition);
        if previous.is_some() {
            warn!("Tool '{}' registered twice; the later definition wins", name);
        } else {
            debug!("Registered tool '{}'", name);
        }
        previous
    }

    /// Run every registration function against `ctx`.
    ///
    /// A registration that panics, or whose definition fails its startup
    /// checks, is skipped with a logged diagnostic; it never aborts the
    /// bootstrap.
    pub fn bootstrap(&mut self, registrations: &[Registration], ctx: &ToolContext) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for (index, register) in registrations.iter().enumerate() {
            let definition = match panic::catch_unwind(AssertUnwindSafe(|| register(ctx))) {
                Ok(definition) => definition,
                Err(payload) => {
                    let diagnostic = format!(
                        "Skipping registration #{}: panicked: {}",
                        index,
                        panic_message(payload)
                    );
                    warn!("{}", diagnostic);
                    report.diagnostics.push(diagnostic);
                    continue;
                }
            };
            match definition.check() {
                Ok(()) => {
                    report.registered.push(definition.name.clone());
                    self.register(definition);
                }
                Err(reason) => {
                    let diagnostic = format!(
                        "Skipping registration #{} ('{}'): {}",
                        index, definition.name, reason
                    );
                    warn!("{}", diagnostic);
                    report.diagnostics.push(diagnostic);
                }
            }
        }

        info!(
            "Tool bootstrap complete: {} registered, {} skipped",
            report.registered.len(),
            report.diagnostics.len()
        );
        report
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Get all tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tools as Tool models (metadata), sorted by name.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.values().map(ToolDefinition::to_tool).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::envelope;
    use crate::domains::tools::error::ToolError;
    use crate::domains::tools::handlers::{FnHandler, ToolResult};
    use crate::domains::tools::schema::{FieldSpec, ToolSchema};
    use crate::domains::tools::args::ToolArgs;
    use futures::FutureExt;
    use futures::future::BoxFuture;

    fn handler(label: &'static str) -> FnHandler<impl Fn(ToolArgs) -> BoxFuture<'static, ToolResult> + Send + Sync> {
        FnHandler(move |_args: ToolArgs| async move { Ok::<_, ToolError>(envelope::text(label)) }.boxed())
    }

    fn alpha(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new("alpha", "First", ToolSchema::new(), handler("alpha"))
    }

    fn beta(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            "beta",
            "Second",
            ToolSchema::new().field(FieldSpec::string("x")),
            handler("beta"),
        )
    }

    fn broken(_ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            "broken",
            "Default violates its own enum",
            ToolSchema::new().field(FieldSpec::one_of("mode", &["a"]).default("z")),
            handler("broken"),
        )
    }

    #[test]
    fn test_bootstrap_skips_invalid_registration() {
        let ctx = ToolContext::for_tests();
        let mut registry = ToolRegistry::new();
        let report = registry.bootstrap(&[alpha, broken, beta], &ctx);

        assert_eq!(registry.len(), 2);
        assert_eq!(report.registered, vec!["alpha", "beta"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].contains("broken"));
        assert!(registry.get("broken").is_none());
    }

    fn panics(_ctx: &ToolContext) -> ToolDefinition {
        panic!("registration blew up")
    }

    #[test]
    fn test_panicking_registration_is_skipped() {
        let ctx = ToolContext::for_tests();
        let mut registry = ToolRegistry::new();
        let report = registry.bootstrap(&[alpha, panics, beta], &ctx);

        assert_eq!(report.registered, vec!["alpha", "beta"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].contains("#1"));
        assert!(report.diagnostics[0].contains("registration blew up"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ToolRegistry::new();
        let first = ToolDefinition::new("dup", "First", ToolSchema::new(), handler("1"));
        let second = ToolDefinition::new("dup", "Second", ToolSchema::new(), handler("2"));

        assert!(registry.register(first).is_none());
        let replaced = registry.register(second).expect("previous definition returned");
        assert_eq!(replaced.description, "First");
        assert_eq!(registry.get("dup").unwrap().description, "Second");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_tools_sorted() {
        let ctx = ToolContext::for_tests();
        let registry = ToolRegistry::bootstrapped(&[beta, alpha], &ctx);
        let names: Vec<_> = registry
            .list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(registry.tool_names(), vec!["alpha", "beta"]);
    }
}

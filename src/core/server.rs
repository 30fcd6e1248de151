//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] bootstraps the tool registry from
//! [`CATALOG`](crate::domains::tools::definitions::CATALOG) once at startup and
//! answers `tools/list` and `tools/call` by delegating to the
//! [`Dispatcher`]. Adding a tool only touches `domains/tools/definitions/`.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::config::Config;
use crate::domains::tools::definitions::CATALOG;
use crate::domains::tools::{BootstrapReport, Dispatcher, ToolContext, ToolRegistry};

const INSTRUCTIONS: &str = "General-purpose tool server. Call tools/list for the catalogue; \
every tools/call answers with a result whose isError flag marks failures.";

/// The main MCP server handler.
///
/// Cheap to clone: every connection of the TCP and HTTP transports gets its
/// own copy sharing the same registry and services.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Shared services handed to the tools at registration.
    context: ToolContext,

    /// Routes calls through the registry.
    dispatcher: Dispatcher,

    /// Outcome of the startup bootstrap.
    report: Arc<BootstrapReport>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let context = ToolContext::new(config.clone());

        let mut registry = ToolRegistry::new();
        let report = registry.bootstrap(CATALOG, &context);

        Self {
            config,
            context,
            dispatcher: Dispatcher::new(Arc::new(registry)),
            report: Arc::new(report),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// What the startup bootstrap registered and skipped.
    pub fn bootstrap_report(&self) -> &BootstrapReport {
        &self.report
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    /// Tear down long-lived tool services (active watchers).
    pub fn shutdown(&self) {
        info!("Stopping {} active watcher(s)", self.context.watches.active().len());
        self.context.watches.shutdown();
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all registered tools as wire JSON.
    pub fn list_tools_json(&self) -> Vec<Value> {
        self.dispatcher
            .registry()
            .list_tools()
            .into_iter()
            .filter_map(|tool| match serde_json::to_value(&tool) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Failed to serialize tool '{}': {}", tool.name, e);
                    None
                }
            })
            .collect()
    }

    /// Call a tool by name and return the Outcome as wire JSON.
    ///
    /// Always yields a `CallToolResult`-shaped object, including for unknown
    /// tools and invalid arguments.
    pub async fn call_tool_json(&self, name: &str, arguments: Value) -> Value {
        let outcome = self.dispatcher.dispatch_value(name, arguments).await;
        serde_json::to_value(&outcome).unwrap_or_else(|e| {
            json!({
                "content": [{ "type": "text", "text": format!("Failed to serialize result: {}", e) }],
                "isError": true
            })
        })
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.dispatcher.registry().list_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatcher
            .dispatch(&request.name, request.arguments)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        let mut config = Config::default();
        config.tools.store_path = std::env::temp_dir().join(format!(
            "toolhub-server-test-{}.sqlite3",
            std::process::id()
        ));
        McpServer::new(config)
    }

    #[test]
    fn test_catalog_is_registered() {
        let server = server();
        assert!(server.bootstrap_report().diagnostics.is_empty());

        let tools = server.list_tools_json();
        assert_eq!(tools.len(), CATALOG.len());
        let read = tools
            .iter()
            .find(|t| t["name"] == "fs_read_file")
            .expect("fs_read_file listed");
        assert_eq!(read["inputSchema"]["type"], "object");
        assert_eq!(read["inputSchema"]["required"], json!(["path"]));
    }

    #[test]
    fn test_capabilities_only_advertise_tools() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }

    #[tokio::test]
    async fn test_call_tool_json_always_returns_envelope() {
        let server = server();

        let unknown = server.call_tool_json("nope", json!({})).await;
        assert_eq!(unknown["isError"], true);
        assert!(unknown["content"][0]["text"].as_str().unwrap().contains("nope"));

        let invalid = server.call_tool_json("fs_read_file", json!({ "max_bytes": 0 })).await;
        assert_eq!(invalid["isError"], true);

        let stats = server
            .call_tool_json("text_stats", json!({ "text": "one two\nthree" }))
            .await;
        assert_ne!(stats["isError"], true);
        assert_eq!(stats["structuredContent"]["words"], 3);
    }

    #[tokio::test]
    async fn test_shutdown_stops_watchers() {
        let server = server();
        let dir = tempfile::TempDir::new().unwrap();
        let outcome = server
            .call_tool_json("watch_start", json!({ "path": dir.path().to_str().unwrap() }))
            .await;
        assert_ne!(outcome["isError"], true);
        assert_eq!(server.context.watches.active().len(), 1);

        server.shutdown();
        assert!(server.context.watches.active().is_empty());
    }
}

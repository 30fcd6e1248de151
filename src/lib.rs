//! Toolhub MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a catalogue of
//! schema-validated tools: filesystem, text, archives, processes, SQLite,
//! network and filesystem watchers.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, path security, the server
//!   handler and the transports (stdio, tcp, http)
//! - **domains::tools**: the dispatch layer (schema, validator, registry,
//!   dispatcher, Outcome envelope) and the tool definitions
//!
//! Every `tools/call` goes through the [`Dispatcher`](domains::tools::Dispatcher)
//! and resolves to a `CallToolResult`; failures carry `isError: true`.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolhub_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     config.validate()?;
//!     let server = McpServer::new(config);
//!     let outcome = server
//!         .call_tool_json("sys_info", serde_json::json!({}))
//!         .await;
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};

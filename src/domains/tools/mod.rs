//! Tools domain module.
//!
//! Tools are executable functions that MCP clients call by name. Every call
//! goes through the same pipeline: the [`Dispatcher`] resolves the name in the
//! [`ToolRegistry`], the [`validator`] checks the arguments against the tool's
//! declarative [`ToolSchema`], the handler runs, and [`envelope`] shapes the
//! result into a uniform `CallToolResult`.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations, grouped by area
//! - `registry.rs` - Name → definition map, filled once at startup
//! - `dispatcher.rs` - Resolve, validate, execute, normalize
//! - `schema.rs` / `validator.rs` / `args.rs` - Argument contract
//! - `services/` - Long-lived state (watchers, item store)
//!
//! ## Adding a New Tool
//!
//! 1. Create a file in the matching `definitions/` group
//! 2. Define `NAME`, `DESCRIPTION`, `schema()` and a `ToolHandler` impl
//! 3. Add its `definition` function to [`definitions::CATALOG`]

pub mod args;
pub mod context;
pub mod definitions;
pub mod dispatcher;
pub mod envelope;
mod error;
mod handlers;
pub mod registry;
pub mod schema;
pub mod services;
pub mod validator;

pub use args::{ArgValue, ToolArgs};
pub use context::ToolContext;
pub use dispatcher::Dispatcher;
pub use error::{ToolError, ValidationError};
pub use handlers::{FnHandler, ToolDefinition, ToolHandler, ToolResult};
pub use registry::{BootstrapReport, Registration, ToolRegistry};
pub use schema::{FieldKind, FieldSpec, ToolSchema};

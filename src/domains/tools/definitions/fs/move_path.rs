//! Move tool definition.
//!
//! A tool that renames or moves files and directories.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{resolve, resolve_new, structured};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Result of a rename/move operation
#[derive(Debug, Serialize, JsonSchema)]
struct MoveResult {
    /// Original path
    from: String,
    /// New path
    to: String,
    /// Type of item moved ("file", "directory", or "item")
    item_type: String,
    /// "renamed" when the parent directory is unchanged, otherwise "moved"
    operation: String,
    /// Present when an existing destination was replaced
    #[serde(skip_serializing_if = "Option::is_none")]
    overwritten: Option<bool>,
}

/// Move tool - renames or moves files and directories.
pub struct FsMoveTool {
    config: Arc<Config>,
}

impl FsMoveTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fs_move";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Rename or move a file or directory. Set overwrite=true to replace an existing destination.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("from").describe("Source path"))
            .field(FieldSpec::string("to").describe("Destination path"))
            .field(
                FieldSpec::boolean("overwrite")
                    .default(false)
                    .describe("Replace the destination if it exists"),
            )
    }

    pub fn definition(ctx: &ToolContext) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Self {
                config: ctx.config.clone(),
            },
        )
        .with_output_schema(rmcp::handler::server::tool::schema_for_type::<MoveResult>())
    }
}

fn item_type(path: &Path) -> &'static str {
    if path.is_dir() {
        "directory"
    } else if path.is_file() {
        "file"
    } else {
        "item"
    }
}

#[async_trait]
impl ToolHandler for FsMoveTool {
    #[instrument(skip_all, fields(from = args.opt_str("from").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let from = args.str("from")?;
        let to = args.str("to")?;
        let overwrite = args.flag("overwrite");
        info!("Move tool called: '{}' -> '{}'", from, to);

        let from_path = resolve(from, &self.config)?;
        let to_path = resolve_new(to, &self.config)?;

        if from_path == to_path {
            return Err(ToolError::failed("Source and destination are the same path"));
        }
        if to_path.starts_with(&from_path) {
            return Err(ToolError::failed(format!(
                "Cannot move '{}' into itself",
                from
            )));
        }

        let destination_exists = to_path.exists();
        if destination_exists {
            if !overwrite {
                warn!("Destination already exists: {}", to);
                return Err(ToolError::failed(format!(
                    "Destination already exists: {}. Use overwrite=true to replace it.",
                    to
                )));
            }
            if to_path.is_dir() {
                fs::remove_dir_all(&to_path)?;
            } else {
                fs::remove_file(&to_path)?;
            }
        }

        let source_type = item_type(&from_path);
        let operation = if from_path.parent() != to_path.parent() {
            "moved"
        } else {
            "renamed"
        };

        fs::rename(&from_path, &to_path).map_err(|e| {
            warn!("Failed to {} '{}' to '{}': {}", operation, from, to, e);
            match e.kind() {
                std::io::ErrorKind::PermissionDenied => ToolError::failed(format!(
                    "Permission denied: Cannot {} '{}' to '{}'",
                    operation, from, to
                )),
                std::io::ErrorKind::NotFound => ToolError::failed(format!(
                    "Destination directory does not exist for '{}'",
                    to
                )),
                _ => ToolError::failed(format!(
                    "Failed to {} '{}' to '{}': {}",
                    operation, from, to, e
                )),
            }
        })?;

        info!("Successfully {} '{}' to '{}'", operation, from, to);
        let result = MoveResult {
            from: from.to_string(),
            to: to.to_string(),
            item_type: source_type.to_string(),
            operation: operation.to_string(),
            overwritten: destination_exists.then_some(true),
        };
        structured(
            format!(
                "Successfully {} {} from '{}' to '{}'",
                operation, source_type, from, to
            ),
            &result,
        )
    }
}

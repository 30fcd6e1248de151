//! Delete tool definition.
//!
//! A tool that deletes files and directories.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{resolve, structured};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Result of a delete operation
#[derive(Debug, Serialize, JsonSchema)]
struct DeleteResult {
    /// Path that was deleted
    path: String,
    /// Type of item deleted ("file", "directory", or "item")
    item_type: String,
    /// Whether recursive deletion was used
    #[serde(skip_serializing_if = "Option::is_none")]
    recursive: Option<bool>,
}

/// Delete tool - deletes files and directories.
pub struct FsDeleteTool {
    config: Arc<Config>,
}

impl FsDeleteTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fs_delete";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Delete a file or directory. Use recursive=true to delete non-empty directories and their contents.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").describe("Path to the file or directory to delete"))
            .field(
                FieldSpec::boolean("recursive")
                    .default(false)
                    .describe("Required to delete non-empty directories"),
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
        .with_output_schema(rmcp::handler::server::tool::schema_for_type::<DeleteResult>())
    }
}

#[async_trait]
impl ToolHandler for FsDeleteTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let recursive = args.flag("recursive");
        info!("Delete tool called: '{}'", raw_path);

        let target = resolve(raw_path, &self.config)?;

        if let Some(root) = &self.config.security.root_path {
            if root.canonicalize().is_ok_and(|root| root == target) {
                return Err(ToolError::failed("Refusing to delete the root directory"));
            }
        }

        let is_directory = target.is_dir();
        let item_type = if is_directory {
            "directory"
        } else if target.is_file() {
            "file"
        } else {
            "item"
        };

        let removed = if is_directory {
            let non_empty = fs::read_dir(&target)
                .map_err(|e| {
                    ToolError::failed(format!("Failed to read directory '{}': {}", raw_path, e))
                })?
                .next()
                .is_some();
            if non_empty && !recursive {
                warn!("Directory is not empty and recursive flag is not set: {}", raw_path);
                return Err(ToolError::failed(format!(
                    "Directory is not empty: {}. Use recursive=true to delete it and its contents.",
                    raw_path
                )));
            }
            if recursive {
                fs::remove_dir_all(&target)
            } else {
                fs::remove_dir(&target)
            }
        } else {
            fs::remove_file(&target)
        };

        removed.map_err(|e| {
            warn!("Failed to delete '{}': {}", raw_path, e);
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                ToolError::failed(format!("Permission denied: Cannot delete '{}'", raw_path))
            } else {
                ToolError::failed(format!("Failed to delete '{}': {}", raw_path, e))
            }
        })?;

        info!("Deleted {} '{}'", item_type, raw_path);
        let result = DeleteResult {
            path: raw_path.to_string(),
            item_type: item_type.to_string(),
            recursive: (is_directory && recursive).then_some(true),
        };
        structured(format!("Successfully deleted {} '{}'", item_type, raw_path), &result)
    }
}

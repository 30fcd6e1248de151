//! List directory tool definition.
//!
//! A tool that lists files and directories in a given path.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, is_hidden, ok_text, resolve};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// List directory tool - lists files and directories in a given path.
pub struct FsListDirTool {
    config: Arc<Config>,
}

impl FsListDirTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fs_list_dir";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "List files and directories in a given path. Returns names, types, and optionally sizes.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").describe("Path to the directory to list"))
            .field(
                FieldSpec::boolean("include_hidden")
                    .default(false)
                    .describe("Include hidden files (starting with '.')"),
            )
            .field(
                FieldSpec::boolean("detailed")
                    .default(false)
                    .describe("Show entry type and size"),
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
    }
}

#[async_trait]
impl ToolHandler for FsListDirTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let include_hidden = args.flag("include_hidden");
        let detailed = args.flag("detailed");
        info!("List directory tool called for path: {}", raw_path);

        let path = resolve(raw_path, &self.config)?;
        if !path.is_dir() {
            return Err(ToolError::failed(format!(
                "Path is not a directory: {}",
                raw_path
            )));
        }

        let entries = fs::read_dir(&path)
            .map_err(|e| ToolError::failed(format!("Failed to read directory: {}", e)))?;

        let mut lines = Vec::new();
        let mut file_count = 0;
        let mut dir_count = 0;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Error reading entry: {}", e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !include_hidden && is_hidden(&name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("Failed to get metadata for {}: {}", name, e);
                    continue;
                }
            };

            if metadata.is_dir() {
                dir_count += 1;
            } else {
                file_count += 1;
            }

            if detailed {
                let kind = if metadata.is_dir() {
                    "DIR "
                } else if metadata.is_symlink() {
                    "LINK"
                } else {
                    "FILE"
                };
                let size = if metadata.is_file() {
                    format_size(metadata.len())
                } else {
                    "-".to_string()
                };
                lines.push(format!("{:4}  {:>10}  {}", kind, size, name));
            } else if metadata.is_dir() {
                lines.push(format!("{}/", name));
            } else {
                lines.push(name);
            }
        }

        lines.sort();

        let mut response = format!("Directory: {}\n", raw_path);
        if detailed {
            response.push_str("\nType  Size        Name\n");
            response.push_str("----  ----------  ----\n");
        }
        response.push_str(&lines.join("\n"));
        response.push_str(&format!(
            "\n\nTotal: {} directories, {} files",
            dir_count, file_count
        ));

        info!("Listed {} entries in {}", lines.len(), raw_path);
        ok_text(response)
    }
}

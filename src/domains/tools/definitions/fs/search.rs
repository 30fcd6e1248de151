//! File search tool definition.
//!
//! Walks a directory tree and matches file names against a glob pattern.

use std::sync::Arc;

use async_trait::async_trait;
use glob::Pattern;
use tracing::{info, instrument};
use walkdir::WalkDir;

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{is_hidden, ok_text, resolve};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct FsSearchTool {
    config: Arc<Config>,
}

impl FsSearchTool {
    pub const NAME: &'static str = "fs_search";

    pub const DESCRIPTION: &'static str = "Recursively find files whose name matches a glob pattern (e.g. '*.rs', 'report-??.csv').";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").describe("Directory to search"))
            .field(FieldSpec::string("pattern").describe("Glob matched against file names"))
            .field(FieldSpec::integer("max_results").range(1.0, 10000.0).default(200))
            .field(FieldSpec::boolean("include_hidden").default(false))
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
impl ToolHandler for FsSearchTool {
    #[instrument(skip_all, fields(pattern = args.opt_str("pattern").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let pattern = Pattern::new(args.str("pattern")?)
            .map_err(|e| ToolError::failed(format!("Invalid glob pattern: {}", e)))?;
        let max_results = args.int("max_results")? as usize;
        let include_hidden = args.flag("include_hidden");

        let root = resolve(raw_path, &self.config)?;
        if !root.is_dir() {
            return Err(ToolError::failed(format!("Path is not a directory: {}", raw_path)));
        }

        let mut matches = Vec::new();
        let mut truncated = false;
        let walker = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || include_hidden || !is_hidden(&e.file_name().to_string_lossy()));

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if pattern.matches(&entry.file_name().to_string_lossy()) {
                if matches.len() == max_results {
                    truncated = true;
                    break;
                }
                matches.push(entry.path().display().to_string());
            }
        }

        matches.sort();
        info!("Found {} matches under {}", matches.len(), raw_path);

        if matches.is_empty() {
            return ok_text(format!("No files matching '{}' under {}", pattern, raw_path));
        }
        let mut body = format!("Found {} file(s):\n{}", matches.len(), matches.join("\n"));
        if truncated {
            body.push_str(&format!("\n\n[limited to {} results]", max_results));
        }
        ok_text(body)
    }
}

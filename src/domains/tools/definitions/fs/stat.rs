//! Stat tool definition.
//!
//! Returns file metadata both as a text summary and as `structuredContent`.

use std::fs;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, resolve, structured};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Metadata for one filesystem entry.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FileStat {
    /// Canonical path
    pub path: String,
    /// "file", "directory", "symlink" or "other"
    pub kind: String,
    pub size_bytes: u64,
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Unix permission bits in octal, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

pub struct FsStatTool {
    config: Arc<Config>,
}

impl FsStatTool {
    pub const NAME: &'static str = "fs_stat";

    pub const DESCRIPTION: &'static str = "Get metadata for a file or directory: type, size, timestamps and permissions.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new().field(FieldSpec::string("path"))
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
        .with_output_schema(rmcp::handler::server::tool::schema_for_type::<FileStat>())
    }
}

fn timestamp(t: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    t.ok().map(DateTime::<Utc>::from)
}

#[cfg(unix)]
fn mode(metadata: &fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:o}", metadata.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn mode(_metadata: &fs::Metadata) -> Option<String> {
    None
}

#[async_trait]
impl ToolHandler for FsStatTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let path = resolve(raw_path, &self.config)?;
        let is_link = fs::symlink_metadata(raw_path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        let metadata = fs::metadata(&path)
            .map_err(|e| ToolError::failed(format!("Cannot stat '{}': {}", raw_path, e)))?;

        let kind = if is_link {
            "symlink"
        } else if metadata.is_dir() {
            "directory"
        } else if metadata.is_file() {
            "file"
        } else {
            "other"
        };

        let stat = FileStat {
            path: path.display().to_string(),
            kind: kind.to_string(),
            size_bytes: metadata.len(),
            readonly: metadata.permissions().readonly(),
            modified: timestamp(metadata.modified()),
            created: timestamp(metadata.created()),
            mode: mode(&metadata),
        };

        let mut summary = format!(
            "{} ({}, {})",
            stat.path,
            stat.kind,
            format_size(stat.size_bytes)
        );
        if let Some(modified) = stat.modified {
            summary.push_str(&format!("\nModified: {}", modified.to_rfc3339()));
        }
        structured(summary, &stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_stat_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data.bin");
        fs::write(&file, [0u8; 2048]).unwrap();

        let def = FsStatTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({ "path": file })).await;

        assert!(envelope::text_of(&outcome).contains("2.0 KB"));
        let data = outcome.structured_content.unwrap();
        assert_eq!(data["kind"], "file");
        assert_eq!(data["size_bytes"], 2048);
        assert!(data["modified"].is_string());
    }

    #[tokio::test]
    async fn test_stat_directory() {
        let temp_dir = TempDir::new().unwrap();
        let def = FsStatTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({ "path": temp_dir.path() })).await;
        assert_eq!(outcome.structured_content.unwrap()["kind"], "directory");
    }

    #[test]
    fn test_advertises_output_schema() {
        let def = FsStatTool::definition(&ToolContext::for_tests());
        let tool = def.to_tool();
        let schema = tool.output_schema.unwrap();
        assert!(schema["properties"].get("size_bytes").is_some());
    }
}

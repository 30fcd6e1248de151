//! Write file tool definition.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, ok_text, resolve_new};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct FsWriteFileTool {
    config: Arc<Config>,
}

impl FsWriteFileTool {
    pub const NAME: &'static str = "fs_write_file";

    pub const DESCRIPTION: &'static str = "Write text (content) or base64 bytes (data) to a file. Exactly one of content or data must be given.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").describe("Destination file"))
            .field(FieldSpec::string("content").optional().describe("UTF-8 text to write"))
            .field(FieldSpec::binary("data").optional().describe("Base64-encoded bytes to write"))
            .field(FieldSpec::boolean("append").default(false))
            .field(
                FieldSpec::boolean("create_dirs")
                    .default(false)
                    .describe("Create missing parent directories"),
            )
            .field(
                FieldSpec::boolean("overwrite")
                    .default(true)
                    .describe("Allow replacing an existing file"),
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
impl ToolHandler for FsWriteFileTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let append = args.flag("append");

        let bytes: &[u8] = match (args.opt_str("content"), args.bytes("data")) {
            (Some(text), None) => text.as_bytes(),
            (None, Some(data)) => data,
            _ => {
                return Err(ToolError::failed(
                    "Provide exactly one of 'content' or 'data'",
                ));
            }
        };

        let path = resolve_new(raw_path, &self.config)?;
        if path.is_dir() {
            return Err(ToolError::failed(format!("Path is a directory: {}", raw_path)));
        }
        let existed = path.exists();
        if existed && !append && !args.flag("overwrite") {
            return Err(ToolError::failed(format!(
                "File already exists: {}. Use overwrite=true to replace it.",
                raw_path
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if !args.flag("create_dirs") {
                    return Err(ToolError::failed(format!(
                        "Parent directory does not exist: {}. Use create_dirs=true to create it.",
                        parent.display()
                    )));
                }
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)?;
        file.write_all(bytes)?;

        let verb = if append {
            "Appended"
        } else if existed {
            "Overwrote"
        } else {
            "Created"
        };
        info!("{} {} ({} bytes)", verb, raw_path, bytes.len());
        ok_text(format!(
            "{} {} ({})",
            verb,
            raw_path,
            format_size(bytes.len() as u64)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use tempfile::TempDir;

    fn def() -> ToolDefinition {
        FsWriteFileTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_write_and_append() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("log.txt");

        let outcome = run(&def(), json!({ "path": file, "content": "one\n" })).await;
        assert!(envelope::text_of(&outcome).starts_with("Created"));

        run(&def(), json!({ "path": file, "content": "two\n", "append": true })).await;
        assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_write_binary_with_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a/b/c.bin");

        let outcome = run(&def(), json!({ "path": file, "data": "AAEC" })).await;
        assert!(envelope::text_of(&outcome).contains("create_dirs=true"));

        let outcome = run(&def(), json!({ "path": file, "data": "AAEC", "create_dirs": true })).await;
        assert!(!envelope::is_error(&outcome));
        assert_eq!(fs::read(&file).unwrap(), vec![0u8, 1, 2]);
    }

    #[tokio::test]
    async fn test_exactly_one_payload() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("x");

        let neither = run(&def(), json!({ "path": file })).await;
        assert!(envelope::text_of(&neither).contains("exactly one"));

        let both = run(&def(), json!({ "path": file, "content": "a", "data": "AAEC" })).await;
        assert!(envelope::is_error(&both));
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_overwrite_false_protects_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("keep.txt");
        fs::write(&file, "original").unwrap();

        let outcome = run(&def(), json!({ "path": file, "content": "new", "overwrite": false })).await;
        assert!(envelope::text_of(&outcome).contains("already exists"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "original");
    }
}

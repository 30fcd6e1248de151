//! Copy tool definition.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, ok_text, resolve, resolve_new};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct FsCopyTool {
    config: Arc<Config>,
}

impl FsCopyTool {
    pub const NAME: &'static str = "fs_copy";

    pub const DESCRIPTION: &'static str = "Copy a file, or a directory tree with recursive=true.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("from"))
            .field(FieldSpec::string("to"))
            .field(FieldSpec::boolean("overwrite").default(false))
            .field(
                FieldSpec::boolean("recursive")
                    .default(false)
                    .describe("Required when copying a directory"),
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

/// Copy the tree under `from` into `to`. Returns (files, bytes).
fn copy_tree(from: &Path, to: &Path, overwrite: bool) -> Result<(u64, u64), ToolError> {
    let mut files = 0;
    let mut bytes = 0;
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| ToolError::failed(format!("Failed to walk '{}': {}", from.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| ToolError::fault(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if target.exists() && !overwrite {
                return Err(ToolError::failed(format!(
                    "Destination already exists: {}. Use overwrite=true to replace it.",
                    target.display()
                )));
            }
            bytes += fs::copy(entry.path(), &target)?;
            files += 1;
        } else {
            debug!("Skipping special file {}", entry.path().display());
        }
    }
    Ok((files, bytes))
}

#[async_trait]
impl ToolHandler for FsCopyTool {
    #[instrument(skip_all, fields(from = args.opt_str("from").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let from = args.str("from")?;
        let to = args.str("to")?;
        let overwrite = args.flag("overwrite");

        let from_path = resolve(from, &self.config)?;
        let to_path = resolve_new(to, &self.config)?;

        if from_path.is_dir() {
            if !args.flag("recursive") {
                return Err(ToolError::failed(format!(
                    "'{}' is a directory. Use recursive=true to copy it.",
                    from
                )));
            }
            if to_path.starts_with(&from_path) {
                return Err(ToolError::failed(format!("Cannot copy '{}' into itself", from)));
            }
            let (files, bytes) = copy_tree(&from_path, &to_path, overwrite)?;
            info!("Copied directory '{}' to '{}' ({} files)", from, to, files);
            return ok_text(format!(
                "Copied directory '{}' to '{}': {} files, {}",
                from,
                to,
                files,
                format_size(bytes)
            ));
        }

        if to_path.exists() && !overwrite {
            return Err(ToolError::failed(format!(
                "Destination already exists: {}. Use overwrite=true to replace it.",
                to
            )));
        }
        if to_path.is_dir() {
            return Err(ToolError::failed(format!("Destination is a directory: {}", to)));
        }
        let bytes = fs::copy(&from_path, &to_path)?;
        info!("Copied '{}' to '{}'", from, to);
        ok_text(format!("Copied '{}' to '{}' ({})", from, to, format_size(bytes)))
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
        FsCopyTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_copy_file() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let dest = temp_dir.path().join("b.txt");
        fs::write(&src, "abc").unwrap();

        let outcome = run(&def(), json!({ "from": src, "to": dest })).await;
        assert!(!envelope::is_error(&outcome));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "abc");
        assert!(src.exists());

        let again = run(&def(), json!({ "from": src, "to": dest })).await;
        assert!(envelope::text_of(&again).contains("already exists"));
    }

    #[tokio::test]
    async fn test_copy_directory_requires_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("tree");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("top.txt"), "1").unwrap();
        fs::write(src.join("nested/deep.txt"), "22").unwrap();
        let dest = temp_dir.path().join("copy");

        let outcome = run(&def(), json!({ "from": src, "to": dest })).await;
        assert!(envelope::text_of(&outcome).contains("recursive=true"));

        let outcome = run(&def(), json!({ "from": src, "to": dest, "recursive": true })).await;
        assert!(envelope::text_of(&outcome).contains("2 files"));
        assert_eq!(fs::read_to_string(dest.join("nested/deep.txt")).unwrap(), "22");
    }

    #[tokio::test]
    async fn test_copy_into_itself() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("tree");
        fs::create_dir(&src).unwrap();

        let outcome = run(
            &def(),
            json!({ "from": src, "to": src.join("inner"), "recursive": true }),
        )
        .await;
        assert!(envelope::text_of(&outcome).contains("into itself"));
    }
}

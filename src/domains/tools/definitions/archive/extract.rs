//! Zip extraction tool definition.
//!
//! Entry names are resolved with `enclosed_name`, so absolute paths and `..`
//! components can never write outside the destination.

use std::fs::{self, File};
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{open_archive, zip_error};
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{ok_text, resolve, resolve_new};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct ZipExtractTool {
    config: Arc<Config>,
}

impl ZipExtractTool {
    pub const NAME: &'static str = "zip_extract";

    pub const DESCRIPTION: &'static str = "Extract a zip archive into a destination directory. Entries that would escape the destination are rejected.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("archive"))
            .field(FieldSpec::string("destination"))
            .field(FieldSpec::boolean("overwrite").default(false))
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
impl ToolHandler for ZipExtractTool {
    #[instrument(skip_all, fields(archive = args.opt_str("archive").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let archive_arg = args.str("archive")?;
        let destination_arg = args.str("destination")?;
        let overwrite = args.flag("overwrite");

        let archive_path = resolve(archive_arg, &self.config)?;
        let destination = resolve_new(destination_arg, &self.config)?;
        let mut archive = open_archive(&archive_path)?;

        // Validate every entry before writing anything.
        let mut plan = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(zip_error)?;
            let Some(relative) = entry.enclosed_name() else {
                warn!("Rejected unsafe entry '{}'", entry.name());
                return Err(ToolError::failed(format!(
                    "Archive entry '{}' escapes the destination directory",
                    entry.name()
                )));
            };
            let target = destination.join(relative);
            if !entry.is_dir() && target.exists() && !overwrite {
                return Err(ToolError::failed(format!(
                    "'{}' already exists. Use overwrite=true to replace it.",
                    target.display()
                )));
            }
            plan.push((index, target, entry.is_dir()));
        }

        fs::create_dir_all(&destination)?;
        let mut files = 0;
        for (index, target, is_dir) in plan {
            if is_dir {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut entry = archive.by_index(index).map_err(zip_error)?;
            io::copy(&mut entry, &mut File::create(&target)?)?;
            files += 1;
        }

        info!("Extracted {} file(s) from {}", files, archive_arg);
        ok_text(format!(
            "Extracted {} file(s) from {} into {}",
            files, archive_arg, destination_arg
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn def() -> ToolDefinition {
        ZipExtractTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_extract() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        write_zip(&archive, &[("top.txt", "1"), ("sub/inner.txt", "2")]);
        let dest = temp_dir.path().join("out");

        let outcome = run(&def(), json!({ "archive": archive, "destination": dest })).await;
        assert!(envelope::text_of(&outcome).contains("Extracted 2 file(s)"));
        assert_eq!(fs::read_to_string(dest.join("sub/inner.txt")).unwrap(), "2");

        let again = run(&def(), json!({ "archive": archive, "destination": dest })).await;
        assert!(envelope::text_of(&again).contains("already exists"));
    }

    #[tokio::test]
    async fn test_rejects_zip_slip() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("evil.zip");
        write_zip(&archive, &[("ok.txt", "fine"), ("../../escaped.txt", "bad")]);
        let dest = temp_dir.path().join("out");

        let outcome = run(&def(), json!({ "archive": archive, "destination": dest })).await;
        assert!(envelope::text_of(&outcome).contains("escapes the destination"));
        assert!(!dest.join("ok.txt").exists());
        assert!(!temp_dir.path().join("escaped.txt").exists());
    }

    #[tokio::test]
    async fn test_not_a_zip() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("plain.zip");
        fs::write(&archive, "plain text").unwrap();

        let outcome = run(
            &def(),
            json!({ "archive": archive, "destination": temp_dir.path().join("out") }),
        )
        .await;
        assert!(envelope::text_of(&outcome).contains("Zip error"));
    }
}

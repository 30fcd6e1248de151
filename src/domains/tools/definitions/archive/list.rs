//! Zip listing tool definition.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use super::{open_archive, zip_error};
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, ok_text, resolve};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolHandler, ToolResult, ToolSchema,
};

pub struct ZipListTool {
    config: Arc<Config>,
}

impl ZipListTool {
    pub const NAME: &'static str = "zip_list";

    pub const DESCRIPTION: &'static str = "List the entries of a zip archive with their sizes.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new().field(FieldSpec::string("archive"))
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
impl ToolHandler for ZipListTool {
    #[instrument(skip_all, fields(archive = args.opt_str("archive").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("archive")?;
        let path = resolve(raw_path, &self.config)?;
        let mut archive = open_archive(&path)?;

        let mut lines = Vec::with_capacity(archive.len());
        let mut total = 0;
        for index in 0..archive.len() {
            let entry = archive.by_index(index).map_err(zip_error)?;
            total += entry.size();
            lines.push(format!(
                "{:>10}  {:>10}  {}",
                format_size(entry.size()),
                format_size(entry.compressed_size()),
                entry.name()
            ));
        }

        ok_text(format!(
            "Archive: {}\n\n      Size  Compressed  Name\n{}\n\n{} entries, {} uncompressed",
            raw_path,
            lines.join("\n"),
            lines.len(),
            format_size(total)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    #[tokio::test]
    async fn test_list_entries() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("a.zip");
        let mut writer = ZipWriter::new(File::create(&archive).unwrap());
        writer.start_file("notes/today.md", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"# today").unwrap();
        writer.finish().unwrap();

        let def = ZipListTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({ "archive": archive })).await;
        let text = envelope::text_of(&outcome);
        assert!(text.contains("notes/today.md"));
        assert!(text.contains("1 entries, 7 B uncompressed"));
    }
}

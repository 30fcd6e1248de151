//! Zip creation tool definition.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::zip_error;
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{format_size, ok_text, resolve, resolve_new};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct ZipCreateTool {
    config: Arc<Config>,
}

impl ZipCreateTool {
    pub const NAME: &'static str = "zip_create";

    pub const DESCRIPTION: &'static str = "Create a zip archive from files and directories. Each source is stored under its own name at the archive root.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("output").describe("Archive file to create"))
            .field(FieldSpec::strings("sources").describe("Files or directories to add"))
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

/// Archive entry names always use `/`.
fn entry_name(base: &str, relative: &Path) -> String {
    let mut name = base.to_string();
    for part in relative.components() {
        name.push('/');
        name.push_str(&part.as_os_str().to_string_lossy());
    }
    name
}

fn add_source(
    writer: &mut ZipWriter<File>,
    source: &Path,
    options: SimpleFileOptions,
    skip: &Path,
) -> Result<usize, ToolError> {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ToolError::failed(format!("Cannot archive '{}'", source.display())))?;

    let mut files = 0;
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| ToolError::failed(format!("Failed to walk '{}': {}", source.display(), e)))?;
        if entry.path() == skip {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ToolError::fault(e.to_string()))?;
        let name = entry_name(&base, relative);

        if entry.file_type().is_dir() {
            writer.add_directory(name, options).map_err(zip_error)?;
        } else if entry.file_type().is_file() {
            debug!("Adding {}", name);
            writer.start_file(name, options).map_err(zip_error)?;
            io::copy(&mut File::open(entry.path())?, writer)?;
            files += 1;
        }
    }
    Ok(files)
}

#[async_trait]
impl ToolHandler for ZipCreateTool {
    #[instrument(skip_all, fields(output = args.opt_str("output").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let output = args.str("output")?;
        let sources = args.strings("sources");
        if sources.is_empty() {
            return Err(ToolError::failed("'sources' must list at least one path"));
        }

        let resolved = sources
            .iter()
            .map(|s| resolve(s, &self.config))
            .collect::<Result<Vec<_>, _>>()?;
        let output_path = resolve_new(output, &self.config)?;
        if output_path.exists() && !args.flag("overwrite") {
            return Err(ToolError::failed(format!(
                "Archive already exists: {}. Use overwrite=true to replace it.",
                output
            )));
        }

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(File::create(&output_path)?);
        let mut files = 0;
        for source in &resolved {
            files += add_source(&mut writer, source, options, &output_path)?;
        }
        writer.finish().map_err(zip_error)?;

        let size = fs::metadata(&output_path)?.len();
        info!("Created {} with {} file(s)", output, files);
        ok_text(format!(
            "Created {} with {} file(s) ({})",
            output,
            files,
            format_size(size)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::archive::open_archive;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;
    use tempfile::TempDir;

    fn def() -> ToolDefinition {
        ZipCreateTool::definition(&ToolContext::for_tests())
    }

    #[tokio::test]
    async fn test_create_from_file_and_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("readme.txt"), "hi").unwrap();
        fs::create_dir_all(root.join("docs/img")).unwrap();
        fs::write(root.join("docs/img/logo.svg"), "<svg/>").unwrap();
        let output = root.join("bundle.zip");

        let outcome = run(
            &def(),
            json!({ "output": output, "sources": [root.join("readme.txt"), root.join("docs")] }),
        )
        .await;
        assert!(envelope::text_of(&outcome).contains("2 file(s)"));

        let mut archive = open_archive(&output).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"readme.txt".to_string()));
        assert!(names.contains(&"docs/img/logo.svg".to_string()));
    }

    #[tokio::test]
    async fn test_refuses_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let output = temp_dir.path().join("out.zip");
        fs::write(&src, "a").unwrap();
        fs::write(&output, "not a zip").unwrap();

        let outcome = run(&def(), json!({ "output": output, "sources": src })).await;
        assert!(envelope::text_of(&outcome).contains("already exists"));
    }
}

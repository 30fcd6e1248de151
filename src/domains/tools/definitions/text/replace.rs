//! Find-and-replace tool definition.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use regex::NoExpand;
use tracing::{info, instrument};

use super::build_matcher;
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{ok_text, resolve};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

pub struct TextReplaceTool {
    config: Arc<Config>,
}

impl TextReplaceTool {
    pub const NAME: &'static str = "text_replace";

    pub const DESCRIPTION: &'static str = "Replace every occurrence of a pattern in a text file. With regex=true the replacement may use $1 / ${name} captures. dry_run reports the count without writing.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path"))
            .field(FieldSpec::string("pattern"))
            .field(FieldSpec::string("replacement"))
            .field(FieldSpec::boolean("regex").default(false))
            .field(FieldSpec::boolean("dry_run").default(false))
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
impl ToolHandler for TextReplaceTool {
    #[instrument(skip_all, fields(path = args.opt_str("path").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let raw_path = args.str("path")?;
        let is_regex = args.flag("regex");
        let replacement = args.str("replacement")?;
        let dry_run = args.flag("dry_run");
        let matcher = build_matcher(args.str("pattern")?, is_regex, false)?;

        let path = resolve(raw_path, &self.config)?;
        if !path.is_file() {
            return Err(ToolError::failed(format!("Not a regular file: {}", raw_path)));
        }
        let original = fs::read_to_string(&path).map_err(|e| {
            ToolError::failed(format!("Cannot read '{}' as UTF-8 text: {}", raw_path, e))
        })?;

        let count = matcher.find_iter(&original).count();
        if count == 0 {
            return ok_text(format!("No occurrences found in {}", raw_path));
        }
        if dry_run {
            return ok_text(format!(
                "Dry run: {} occurrence(s) would be replaced in {}",
                count, raw_path
            ));
        }

        let updated = if is_regex {
            matcher.replace_all(&original, replacement)
        } else {
            matcher.replace_all(&original, NoExpand(replacement))
        };
        fs::write(&path, updated.as_bytes())?;

        info!("Replaced {} occurrence(s) in {}", count, raw_path);
        ok_text(format!("Replaced {} occurrence(s) in {}", count, raw_path))
    }
}

//! Text search tool definition.
//!
//! Searches one file, or every text file below a directory, line by line.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use super::build_matcher;
use crate::core::config::Config;
use crate::domains::tools::definitions::common::{is_hidden, ok_text, resolve, truncate_chars};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolHandler, ToolResult, ToolSchema,
};

const MAX_LINE_CHARS: usize = 300;

pub struct TextGrepTool {
    config: Arc<Config>,
}

impl TextGrepTool {
    pub const NAME: &'static str = "text_grep";

    pub const DESCRIPTION: &'static str = "Search files for lines matching a pattern. Accepts a file or a directory (searched recursively, hidden and binary files skipped).";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("pattern"))
            .field(FieldSpec::string("path").describe("File or directory to search"))
            .field(
                FieldSpec::boolean("regex")
                    .default(true)
                    .describe("Treat pattern as a regular expression; false for a literal"),
            )
            .field(FieldSpec::boolean("case_insensitive").default(false))
            .field(FieldSpec::integer("max_matches").range(1.0, 10000.0).default(200))
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

/// Append matches in `path` to `out`. Returns false once `limit` is reached.
fn grep_file(path: &Path, matcher: &Regex, limit: usize, out: &mut Vec<String>) -> bool {
    let Ok(bytes) = fs::read(path) else {
        debug!("Skipping unreadable file {}", path.display());
        return true;
    };
    // NUL in the first block marks a binary file
    if bytes.iter().take(8192).any(|b| *b == 0) {
        return true;
    }
    let text = String::from_utf8_lossy(&bytes);
    for (index, line) in text.lines().enumerate() {
        if matcher.is_match(line) {
            if out.len() == limit {
                return false;
            }
            let (line, _) = truncate_chars(line.trim_end(), MAX_LINE_CHARS);
            out.push(format!("{}:{}: {}", path.display(), index + 1, line));
        }
    }
    true
}

#[async_trait]
impl ToolHandler for TextGrepTool {
    #[instrument(skip_all, fields(pattern = args.opt_str("pattern").unwrap_or_default()))]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let matcher = build_matcher(
            args.str("pattern")?,
            args.flag("regex"),
            args.flag("case_insensitive"),
        )?;
        let raw_path = args.str("path")?;
        let limit = args.int("max_matches")? as usize;
        let root = resolve(raw_path, &self.config)?;

        let mut matches = Vec::new();
        let mut complete = true;
        if root.is_file() {
            complete = grep_file(&root, &matcher, limit, &mut matches);
        } else {
            let files = WalkDir::new(&root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file());
            for entry in files {
                if !grep_file(entry.path(), &matcher, limit, &mut matches) {
                    complete = false;
                    break;
                }
            }
        }

        info!("{} matching line(s) under {}", matches.len(), raw_path);
        if matches.is_empty() {
            return ok_text("No matches found");
        }
        let mut body = matches.join("\n");
        if !complete {
            body.push_str(&format!("\n\n[stopped after {} matches]", limit));
        }
        ok_text(body)
    }
}

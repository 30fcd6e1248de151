//! Text statistics tool definition.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::instrument;

use crate::core::config::Config;
use crate::domains::tools::definitions::common::{resolve, structured};
use crate::domains::tools::{
    FieldSpec, ToolArgs, ToolContext, ToolDefinition, ToolError, ToolHandler, ToolResult,
    ToolSchema,
};

/// Counts for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub chars: usize,
    pub bytes: usize,
    /// Length in chars of the longest line
    pub longest_line: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            lines: text.lines().count(),
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
            bytes: text.len(),
            longest_line: text.lines().map(|l| l.chars().count()).max().unwrap_or(0),
        }
    }
}

pub struct TextStatsTool {
    config: Arc<Config>,
}

impl TextStatsTool {
    pub const NAME: &'static str = "text_stats";

    pub const DESCRIPTION: &'static str = "Count lines, words, characters and bytes of a file (path) or of inline text. Exactly one of the two must be given.";

    pub fn schema() -> ToolSchema {
        ToolSchema::new()
            .field(FieldSpec::string("path").optional())
            .field(FieldSpec::string("text").optional())
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
        .with_output_schema(rmcp::handler::server::tool::schema_for_type::<TextStats>())
    }
}

#[async_trait]
impl ToolHandler for TextStatsTool {
    #[instrument(skip_all)]
    async fn call(&self, args: ToolArgs) -> ToolResult {
        let (label, text) = match (args.opt_str("path"), args.opt_str("text")) {
            (Some(raw_path), None) => {
                let path = resolve(raw_path, &self.config)?;
                let text = fs::read_to_string(&path).map_err(|e| {
                    ToolError::failed(format!("Cannot read '{}' as UTF-8 text: {}", raw_path, e))
                })?;
                (raw_path.to_string(), text)
            }
            (None, Some(text)) => ("input".to_string(), text.to_string()),
            _ => return Err(ToolError::failed("Provide exactly one of 'path' or 'text'")),
        };

        let stats = TextStats::of(&text);
        structured(
            format!(
                "{}: {} lines, {} words, {} chars, {} bytes",
                label, stats.lines, stats.words, stats.chars, stats.bytes
            ),
            &stats,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::common::run;
    use crate::domains::tools::envelope;
    use serde_json::json;

    #[test]
    fn test_counts() {
        let stats = TextStats::of("héllo world\nsecond line here\n");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.words, 5);
        assert_eq!(stats.chars, 29);
        assert_eq!(stats.bytes, 30);
        assert_eq!(stats.longest_line, 16);
    }

    #[tokio::test]
    async fn test_inline_text() {
        let def = TextStatsTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({ "text": "one two" })).await;
        assert_eq!(outcome.structured_content.unwrap()["words"], 2);
    }

    #[tokio::test]
    async fn test_requires_exactly_one_source() {
        let def = TextStatsTool::definition(&ToolContext::for_tests());
        let outcome = run(&def, json!({})).await;
        assert!(envelope::text_of(&outcome).contains("exactly one"));
    }
}

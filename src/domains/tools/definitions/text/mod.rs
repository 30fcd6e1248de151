pub mod grep;
pub mod replace;
pub mod stats;

pub use grep::TextGrepTool;
pub use replace::TextReplaceTool;
pub use stats::{TextStats, TextStatsTool};

use regex::{Regex, RegexBuilder};

use crate::domains::tools::ToolError;

/// Compile `pattern` as a regex, or as a literal when `is_regex` is false.
pub(crate) fn build_matcher(pattern: &str, is_regex: bool, case_insensitive: bool) -> Result<Regex, ToolError> {
    let source = if is_regex {
        pattern.to_string()
    } else {
        regex::escape(pattern)
    };
    RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ToolError::failed(format!("Invalid pattern: {}", e)))
}

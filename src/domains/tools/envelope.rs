//! Response envelope normalization.
//!
//! Every exit from the dispatcher passes through here, so clients always see
//! `{content: [{type: "text", text}, ...], isError?}` whatever path produced
//! it: success, unknown tool, validation failure, handler error or fault.

use rmcp::model::{CallToolResult, Content};

use super::error::ToolError;
use super::handlers::ToolResult;

/// A successful Outcome with a single text block.
pub fn text(body: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(body.into())])
}

/// A successful Outcome with a text summary plus structured content.
pub fn structured(summary: impl Into<String>, data: serde_json::Value) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(summary.into())],
        structured_content: Some(data),
        is_error: Some(false),
        meta: None,
    }
}

/// An error Outcome with a single text block.
pub fn error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Convert any [`ToolError`] into an error Outcome.
pub fn from_error(err: &ToolError) -> CallToolResult {
    error(err.to_string())
}

/// Normalize whatever a handler produced.
pub fn from_handler(result: ToolResult) -> CallToolResult {
    match result {
        Ok(outcome) => normalize(outcome),
        Err(err) => from_error(&err),
    }
}

/// Guarantee at least one text block, so no path yields an empty envelope.
pub fn normalize(mut outcome: CallToolResult) -> CallToolResult {
    if outcome.content.is_empty() {
        let placeholder = if outcome.is_error == Some(true) {
            "Tool failed without a message"
        } else {
            "(no output)"
        };
        outcome.content.push(Content::text(placeholder));
    }
    outcome
}

/// Concatenated text of all text blocks. Used by logging and tests.
pub fn text_of(outcome: &CallToolResult) -> String {
    outcome
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the Outcome reports a failure.
pub fn is_error(outcome: &CallToolResult) -> bool {
    outcome.is_error.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::error::ValidationError;

    #[test]
    fn test_handler_error_becomes_error_outcome() {
        let outcome = from_handler(Err(ToolError::failed("file not found: /x")));
        assert!(is_error(&outcome));
        assert_eq!(text_of(&outcome), "file not found: /x");
    }

    #[test]
    fn test_validation_error_outcome_names_field() {
        let err = ToolError::from(ValidationError::Missing {
            field: "path".to_string(),
        });
        let outcome = from_error(&err);
        assert!(is_error(&outcome));
        assert!(text_of(&outcome).contains("`path`"));
    }

    #[test]
    fn test_empty_content_is_filled() {
        let outcome = normalize(CallToolResult::error(vec![]));
        assert_eq!(outcome.content.len(), 1);
        assert!(is_error(&outcome));

        let outcome = normalize(CallToolResult::success(vec![]));
        assert_eq!(text_of(&outcome), "(no output)");
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(error("boom")).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "boom");
        assert_eq!(value["isError"], true);

        let value = serde_json::to_value(structured("done", serde_json::json!({"n": 1}))).unwrap();
        assert_eq!(value["structuredContent"]["n"], 1);
        assert_eq!(value["isError"], false);
    }
}

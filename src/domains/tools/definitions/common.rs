//! Helpers shared by tool definitions.

use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::core::config::Config;
use crate::core::security::{validate_new_path, validate_path};
use crate::domains::tools::{ToolError, ToolResult, envelope};

/// Resolve an existing path through the root-path security check.
pub fn resolve(path: &str, config: &Config) -> Result<PathBuf, ToolError> {
    validate_path(path, config).map_err(|e| {
        warn!("Path security validation failed: {}", e);
        ToolError::failed(format!("Path security validation failed: {}", e))
    })
}

/// Resolve a destination that may not exist yet.
pub fn resolve_new(path: &str, config: &Config) -> Result<PathBuf, ToolError> {
    validate_new_path(path, config).map_err(|e| {
        warn!("Path security validation failed: {}", e);
        ToolError::failed(format!("Path security validation failed: {}", e))
    })
}

/// Text summary plus `structuredContent` built from `data`.
pub fn structured<T: Serialize>(summary: impl Into<String>, data: &T) -> ToolResult {
    let value = serde_json::to_value(data)
        .map_err(|e| ToolError::fault(format!("failed to serialize result: {}", e)))?;
    Ok(envelope::structured(summary, value))
}

/// Wrap a plain text body.
pub fn ok_text(body: impl Into<String>) -> ToolResult {
    Ok(envelope::text(body))
}

/// Format file size in human-readable format.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Cut `text` to at most `max_chars` characters. The flag reports truncation.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (text[..byte_idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Cut a byte buffer to `max_bytes` and decode it lossily.
pub fn truncate_bytes(bytes: &[u8], max_bytes: usize) -> (String, bool) {
    if bytes.len() > max_bytes {
        (String::from_utf8_lossy(&bytes[..max_bytes]).into_owned(), true)
    } else {
        (String::from_utf8_lossy(bytes).into_owned(), false)
    }
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Validate `args` against `definition` and run its handler, as the
/// dispatcher would minus the task isolation.
#[cfg(test)]
pub async fn run(
    definition: &crate::domains::tools::ToolDefinition,
    args: serde_json::Value,
) -> rmcp::model::CallToolResult {
    let raw = args.as_object().cloned().unwrap_or_default();
    match crate::domains::tools::validator::validate(&definition.schema, raw) {
        Ok(args) => envelope::from_handler(definition.handler.call(args).await),
        Err(e) => envelope::from_error(&ToolError::from(e)),
    }
}

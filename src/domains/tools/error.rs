//! Tool-specific error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during tool operations.
///
/// Every variant terminates at the dispatch boundary: the dispatcher turns it
/// into an error Outcome, never into a protocol-level failure.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found in the registry.
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    /// The arguments did not satisfy the tool's schema.
    #[error("Invalid arguments: {0}")]
    Validation(#[from] ValidationError),

    /// The handler detected a domain-level problem.
    #[error("{0}")]
    Failed(String),

    /// The handler gave up waiting on its own I/O.
    #[error("Timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The handler panicked or was torn down unexpectedly.
    #[error("Tool crashed: {0}")]
    Fault(String),

    /// Filesystem or process I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new domain failure.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    /// Create a new fault (unexpected crash).
    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}

/// A single schema violation. Validation stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The arguments payload was not a JSON object.
    #[error("arguments must be a JSON object")]
    NotAnObject,

    /// A required field was absent and has no default.
    #[error("missing required field: `{field}`")]
    Missing { field: String },

    /// The value could not be coerced to the declared type.
    #[error("field `{field}` must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// A numeric value fell outside its declared range.
    #[error("field `{field}` must be {}, got {value}", describe_range(.min, .max))]
    OutOfRange {
        field: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// A string was not one of the declared enum members.
    #[error("field `{field}` must be one of [{}], got `{value}`", .allowed.join(", "))]
    NotInEnum {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// A binary field did not carry valid base64.
    #[error("field `{field}` is not valid base64: {reason}")]
    InvalidEncoding { field: String, reason: String },
}

impl ValidationError {
    /// The offending field, when the violation is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotAnObject => None,
            Self::Missing { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotInEnum { field, .. }
            | Self::InvalidEncoding { field, .. } => Some(field),
        }
    }
}

fn describe_range(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(min), Some(max)) => format!("between {} and {}", min, max),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (None, None) => "a number".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_field() {
        let err = ValidationError::Missing {
            field: "path".to_string(),
        };
        assert_eq!(err.to_string(), "missing required field: `path`");
        assert_eq!(err.field(), Some("path"));
    }

    #[test]
    fn test_range_message() {
        let err = ValidationError::OutOfRange {
            field: "limit".to_string(),
            value: 0.0,
            min: Some(1.0),
            max: Some(10.0),
        };
        assert_eq!(
            err.to_string(),
            "field `limit` must be between 1 and 10, got 0"
        );
    }

    #[test]
    fn test_validation_converts_into_tool_error() {
        let err: ToolError = ValidationError::NotAnObject.into();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid arguments"));
    }
}

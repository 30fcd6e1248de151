//! Validated, typed tool arguments.

use std::collections::HashMap;

use rmcp::model::JsonObject;

use super::error::ToolError;

/// A single validated value. The variant follows the declared field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    StrList(Vec<String>),
    Bytes(Vec<u8>),
}

/// Arguments after schema validation, with defaults applied.
///
/// Declared fields are exposed through typed accessors. The original raw
/// object is kept as well, so handlers can read undeclared extras.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    values: HashMap<String, ArgValue>,
    raw: JsonObject,
}

impl ToolArgs {
    pub(crate) fn new(values: HashMap<String, ArgValue>, raw: JsonObject) -> Self {
        Self { values, raw }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// The arguments exactly as received, including undeclared fields.
    pub fn raw(&self) -> &JsonObject {
        &self.raw
    }

    pub fn opt_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// A required string field.
    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name).ok_or_else(|| missing(name))
    }

    pub fn opt_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// A required integer field.
    pub fn int(&self, name: &str) -> Result<i64, ToolError> {
        self.opt_int(name).ok_or_else(|| missing(name))
    }

    pub fn opt_float(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(ArgValue::Float(n)) => Some(*n),
            Some(ArgValue::Int(n)) => Some(*n as f64),
            _ => None,
        }
    }

    /// Boolean flag; absent counts as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Bool(true)))
    }

    /// String list; absent counts as empty.
    pub fn strings(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(ArgValue::StrList(items)) => items,
            _ => &[],
        }
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.values.get(name) {
            Some(ArgValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }
}

// Reaching this means a handler asked for a field its own schema does not
// declare as required.
fn missing(name: &str) -> ToolError {
    ToolError::fault(format!("field `{}` was not provided by validation", name))
}

//! Declarative input schemas.
//!
//! A [`ToolSchema`] is an ordered list of [`FieldSpec`]s drawn from a small
//! closed set of field kinds. The same description drives argument validation
//! (see `validator.rs`) and the JSON Schema advertised in `tools/list`.

use std::collections::HashSet;
use std::sync::Arc;

use rmcp::model::JsonObject;
use serde_json::{Value, json};

/// The type of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Any JSON string.
    String,

    /// A number, optionally restricted to integers and to a closed range.
    Number {
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// `true` or `false`.
    Boolean,

    /// One of a fixed set of strings.
    Enum(Vec<String>),

    /// A list of strings.
    StringArray,

    /// Opaque bytes, carried as base64 text on the wire.
    Binary,
}

impl FieldKind {
    /// Human-readable type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number { integer: true, .. } => "an integer",
            Self::Number { integer: false, .. } => "a number",
            Self::Boolean => "a boolean",
            Self::Enum(_) => "a string",
            Self::StringArray => "an array of strings",
            Self::Binary => "a base64 string",
        }
    }
}

/// Descriptor for one named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl FieldSpec {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                integer: false,
                min: None,
                max: None,
            },
        )
    }

    pub fn integer(name: &str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                integer: true,
                min: None,
                max: None,
            },
        )
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn one_of(name: &str, members: &[&str]) -> Self {
        Self::new(
            name,
            FieldKind::Enum(members.iter().map(|m| m.to_string()).collect()),
        )
    }

    pub fn strings(name: &str) -> Self {
        Self::new(name, FieldKind::StringArray)
    }

    pub fn binary(name: &str) -> Self {
        Self::new(name, FieldKind::Binary)
    }

    /// Mark the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Substitute `value` when the field is absent. Implies optional.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Restrict a number field to `[min, max]`. No-op on other kinds.
    pub fn range(mut self, lo: f64, hi: f64) -> Self {
        if let FieldKind::Number { min, max, .. } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// Restrict a number field to `>= lo`. No-op on other kinds.
    pub fn at_least(mut self, lo: f64) -> Self {
        if let FieldKind::Number { min, .. } = &mut self.kind {
            *min = Some(lo);
        }
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut prop = match &self.kind {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Number { integer, min, max } => {
                let ty = if *integer { "integer" } else { "number" };
                let mut p = json!({ "type": ty });
                if let Some(min) = min {
                    p["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    p["maximum"] = json!(max);
                }
                p
            }
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Enum(members) => json!({ "type": "string", "enum": members }),
            FieldKind::StringArray => json!({ "type": "array", "items": { "type": "string" } }),
            FieldKind::Binary => json!({ "type": "string", "contentEncoding": "base64" }),
        };
        if let Some(description) = &self.description {
            prop["description"] = json!(description);
        }
        if let Some(default) = &self.default {
            prop["default"] = default.clone();
        }
        prop
    }
}

/// The complete input contract of one tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    fields: Vec<FieldSpec>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field (builder style).
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Structural sanity checks run once at bootstrap.
    ///
    /// Defaults are checked separately by the registry, since that needs the
    /// validator.
    pub fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err("field with an empty name".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("duplicate field `{}`", field.name));
            }
            match &field.kind {
                FieldKind::Enum(members) if members.is_empty() => {
                    return Err(format!("enum field `{}` has no members", field.name));
                }
                FieldKind::Number {
                    min: Some(min),
                    max: Some(max),
                    ..
                } if min > max => {
                    return Err(format!(
                        "field `{}` has an empty range [{}, {}]",
                        field.name, min, max
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Render as a JSON Schema object for `tools/list`.
    pub fn to_json_schema(&self) -> Arc<JsonObject> {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        Arc::new(schema)
    }
}

//! Generic schema validator.
//!
//! One pass over the declared fields, in declaration order:
//! coerce present values, substitute defaults for absent ones, reject missing
//! required fields, then check ranges and enum membership. The first
//! violation wins. Undeclared fields are not rejected; they stay reachable
//! through [`ToolArgs::raw`].

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::args::{ArgValue, ToolArgs};
use super::error::ValidationError;
use super::schema::{FieldKind, FieldSpec, ToolSchema};

/// Validate `raw` against `schema`.
pub fn validate(schema: &ToolSchema, raw: JsonObject) -> Result<ToolArgs, ValidationError> {
    let mut values = HashMap::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let present = raw.get(&field.name).filter(|v| !v.is_null());
        let source = match (present, &field.default) {
            (Some(value), _) => value,
            (None, Some(default)) => default,
            (None, None) if field.required => {
                return Err(ValidationError::Missing {
                    field: field.name.clone(),
                });
            }
            (None, None) => continue,
        };
        values.insert(field.name.clone(), coerce(field, source)?);
    }

    Ok(ToolArgs::new(values, raw))
}

/// Coerce and constrain a single value against its field descriptor.
pub fn coerce(field: &FieldSpec, value: &Value) -> Result<ArgValue, ValidationError> {
    let wrong_type = || ValidationError::WrongType {
        field: field.name.clone(),
        expected: field.kind.type_name(),
        found: describe(value),
    };

    match &field.kind {
        FieldKind::String => value
            .as_str()
            .map(|s| ArgValue::Str(s.to_string()))
            .ok_or_else(wrong_type),

        FieldKind::Number { integer, min, max } => {
            let out_of_range = |value: f64| ValidationError::OutOfRange {
                field: field.name.clone(),
                value,
                min: *min,
                max: *max,
            };
            let check_range = |n: f64| {
                if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                    Err(out_of_range(n))
                } else {
                    Ok(())
                }
            };

            if *integer {
                let n = match to_integer(value) {
                    Integer::Exact(n) => n,
                    Integer::Overflow(n) => return Err(out_of_range(n)),
                    Integer::Invalid => return Err(wrong_type()),
                };
                check_range(n as f64)?;
                return Ok(ArgValue::Int(n));
            }

            let n = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(wrong_type)?;
            check_range(n)?;
            Ok(ArgValue::Float(n))
        }

        FieldKind::Boolean => match value {
            Value::Bool(b) => Ok(ArgValue::Bool(*b)),
            Value::String(s) if s == "true" => Ok(ArgValue::Bool(true)),
            Value::String(s) if s == "false" => Ok(ArgValue::Bool(false)),
            _ => Err(wrong_type()),
        },

        FieldKind::Enum(members) => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            if members.iter().any(|m| m == s) {
                Ok(ArgValue::Str(s.to_string()))
            } else {
                Err(ValidationError::NotInEnum {
                    field: field.name.clone(),
                    value: s.to_string(),
                    allowed: members.clone(),
                })
            }
        }

        FieldKind::StringArray => match value {
            Value::String(s) => Ok(ArgValue::StrList(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ArgValue::StrList)
                .ok_or_else(wrong_type),
            _ => Err(wrong_type()),
        },

        FieldKind::Binary => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            BASE64
                .decode(s.trim())
                .map(ArgValue::Bytes)
                .map_err(|e| ValidationError::InvalidEncoding {
                    field: field.name.clone(),
                    reason: e.to_string(),
                })
        }
    }
}

enum Integer {
    Exact(i64),
    /// Integral, but outside the `i64` range.
    Overflow(f64),
    Invalid,
}

/// Read an integer without a lossy trip through `f64`.
///
/// Integral floats such as `3.0` are accepted when they fit `i64` exactly.
fn to_integer(value: &Value) -> Integer {
    // 2^63; every integral f64 in [-2^63, 2^63) converts to i64 exactly.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    let float = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Integer::Exact(i);
            }
            if let Some(u) = n.as_u64() {
                return Integer::Overflow(u as f64);
            }
            n.as_f64()
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Integer::Exact(i);
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };

    match float {
        Some(f) if f.is_finite() && f.fract() == 0.0 => {
            if (-LIMIT..LIMIT).contains(&f) {
                Integer::Exact(f as i64)
            } else {
                Integer::Overflow(f)
            }
        }
        _ => Integer::Invalid,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::schema::FieldSpec;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_required_field() {
        let schema = ToolSchema::new().field(FieldSpec::string("path"));
        let err = validate(&schema, JsonObject::new()).unwrap_err();
        assert_eq!(err.field(), Some("path"));
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_default_substitution() {
        let schema = ToolSchema::new().field(FieldSpec::number("count").default(4));
        let args = validate(&schema, JsonObject::new()).unwrap();
        assert_eq!(args.opt_float("count"), Some(4.0));

        let schema = ToolSchema::new().field(FieldSpec::integer("count").default(4));
        let args = validate(&schema, JsonObject::new()).unwrap();
        assert_eq!(args.int("count").unwrap(), 4);
    }

    #[test]
    fn test_large_integers_keep_their_value() {
        let schema = ToolSchema::new().field(FieldSpec::integer("n"));

        let args = validate(&schema, object(json!({ "n": 9007199254740993u64 }))).unwrap();
        assert_eq!(args.int("n").unwrap(), 9_007_199_254_740_993);

        let args = validate(&schema, object(json!({ "n": "-9007199254740993" }))).unwrap();
        assert_eq!(args.int("n").unwrap(), -9_007_199_254_740_993);

        let args = validate(&schema, object(json!({ "n": 3.0 }))).unwrap();
        assert_eq!(args.int("n").unwrap(), 3);
    }

    #[test]
    fn test_integers_beyond_i64_are_rejected() {
        let schema = ToolSchema::new().field(FieldSpec::integer("n").at_least(1.0));

        for huge in [json!(1e300), json!(u64::MAX), json!("1e300")] {
            let err = validate(&schema, object(json!({ "n": huge }))).unwrap_err();
            assert!(
                matches!(err, ValidationError::OutOfRange { .. }),
                "{:?} gave {}",
                huge,
                err
            );
        }

        let err = validate(&schema, object(json!({ "n": 2.5 }))).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let schema = ToolSchema::new().field(FieldSpec::integer("count").default(4));
        let args = validate(&schema, object(json!({ "count": null }))).unwrap();
        assert_eq!(args.int("count").unwrap(), 4);
    }

    #[test]
    fn test_optional_without_default_is_skipped() {
        let schema = ToolSchema::new().field(FieldSpec::string("note").optional());
        let args = validate(&schema, JsonObject::new()).unwrap();
        assert!(args.get("note").is_none());
    }

    #[test]
    fn test_range_boundaries() {
        let schema = ToolSchema::new().field(FieldSpec::integer("n").range(1.0, 10.0));

        for ok in [1, 10] {
            let args = validate(&schema, object(json!({ "n": ok }))).unwrap();
            assert_eq!(args.int("n").unwrap(), ok);
        }
        for bad in [0, 11] {
            let err = validate(&schema, object(json!({ "n": bad }))).unwrap_err();
            assert!(matches!(err, ValidationError::OutOfRange { .. }));
            assert_eq!(err.field(), Some("n"));
        }
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let schema = ToolSchema::new().field(FieldSpec::integer("n"));
        let err = validate(&schema, object(json!({ "n": 1.5 }))).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[test]
    fn test_numeric_string_is_coerced() {
        let schema = ToolSchema::new().field(FieldSpec::integer("n"));
        let args = validate(&schema, object(json!({ "n": "42" }))).unwrap();
        assert_eq!(args.int("n").unwrap(), 42);
    }

    #[test]
    fn test_enum_violation_names_field() {
        let schema = ToolSchema::new().field(FieldSpec::one_of("mode", &["a", "b"]));
        let err = validate(&schema, object(json!({ "mode": "c" }))).unwrap_err();
        assert_eq!(err.field(), Some("mode"));
        assert!(err.to_string().contains("mode"));
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn test_string_rejects_number() {
        let schema = ToolSchema::new().field(FieldSpec::string("path"));
        let err = validate(&schema, object(json!({ "path": 7 }))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `path` must be a string, got 7"
        );
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = ToolSchema::new().field(FieldSpec::boolean("flag"));
        let args = validate(&schema, object(json!({ "flag": "true" }))).unwrap();
        assert!(args.flag("flag"));
        assert!(validate(&schema, object(json!({ "flag": 1 }))).is_err());
    }

    #[test]
    fn test_string_array() {
        let schema = ToolSchema::new().field(FieldSpec::strings("items"));
        let args = validate(&schema, object(json!({ "items": ["x", "y"] }))).unwrap();
        assert_eq!(args.strings("items"), ["x".to_string(), "y".to_string()]);

        let args = validate(&schema, object(json!({ "items": "solo" }))).unwrap();
        assert_eq!(args.strings("items"), ["solo".to_string()]);

        assert!(validate(&schema, object(json!({ "items": ["x", 1] }))).is_err());
    }

    #[test]
    fn test_binary_decoding() {
        let schema = ToolSchema::new().field(FieldSpec::binary("data"));
        let args = validate(&schema, object(json!({ "data": "aGVsbG8=" }))).unwrap();
        assert_eq!(args.bytes("data"), Some(&b"hello"[..]));

        let err = validate(&schema, object(json!({ "data": "***" }))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let schema = ToolSchema::new().field(FieldSpec::string("path"));
        let args = validate(&schema, object(json!({ "path": "/", "extra": 1 }))).unwrap();
        assert!(args.get("extra").is_none());
        assert_eq!(args.raw()["extra"], 1);
    }

    #[test]
    fn test_first_violation_wins() {
        let schema = ToolSchema::new()
            .field(FieldSpec::string("first"))
            .field(FieldSpec::string("second"));
        let err = validate(&schema, JsonObject::new()).unwrap_err();
        assert_eq!(err.field(), Some("first"));
    }
}

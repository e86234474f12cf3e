//! Record helpers
//!
//! Records are caller-shaped JSON objects. These helpers make field access
//! and coercion explicit instead of relying on casts at the call site.

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};

/// A record: field name -> value
pub type Record = Map<String, Value>;

/// Converts an arbitrary value into a record, rejecting non-objects.
pub fn record_from_value(value: Value) -> StoreResult<Record> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::InvalidRecord(format!(
            "expected an object, found {}",
            type_name(&other)
        ))),
    }
}

/// Reads a string field.
pub fn field_str<'a>(record: &'a Record, field: &str) -> StoreResult<&'a str> {
    field_value(record, field)?
        .as_str()
        .ok_or_else(|| StoreError::TypeMismatch {
            field: field.to_string(),
            expected: "a string",
        })
}

/// Reads an integer field. Floats with no fractional part are not accepted.
pub fn field_i64(record: &Record, field: &str) -> StoreResult<i64> {
    field_value(record, field)?
        .as_i64()
        .ok_or_else(|| StoreError::TypeMismatch {
            field: field.to_string(),
            expected: "an integer",
        })
}

fn field_value<'a>(record: &'a Record, field: &str) -> StoreResult<&'a Value> {
    record.get(field).ok_or_else(|| StoreError::MissingField {
        field: field.to_string(),
    })
}

/// Human-readable rendering used in error messages.
///
/// Strings are shown bare, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Value equality used by unique constraints.
///
/// Numbers compare by numeric value, so `42` equals `42.0`. Arrays and
/// objects compare element-wise with the same rule. Other types compare as
/// plain JSON.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x == y
                || match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// JSON type name of a value
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

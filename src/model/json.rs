//! Helpers for request fields that clients may send as any JSON value.

use serde_json::Value;

/// Whether a JSON value counts as present: not null, false, zero or the empty string.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The cell text for a JSON value. Strings are written unquoted and null is an empty cell.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The cell text for an optional field, treating every falsy value as absent.
pub(crate) fn text_or_empty(value: Option<&Value>) -> String {
    value
        .filter(|v| is_truthy(v))
        .map(cell_text)
        .unwrap_or_default()
}

//! Helpers over the primitive value tree.
//!
//! Rules compare loosely typed contract data: a form-encoded `"5"` and a
//! JSON `5` are both numeric-looking and order numerically, while any other
//! pair falls back to a byte-wise comparison of the string renderings.

use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?\s*$")
            .expect("numeric regex must compile")
    })
}

/// Name of the value's shape, as reported by `TypeMismatch`.
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

/// Numeric interpretation of a scalar, if it looks like a number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if numeric_re().is_match(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn is_numeric(value: &Value) -> bool {
    as_number(value).is_some()
}

/// String rendering used for lexicographic comparison.
fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Order two scalars: numerically when both look numeric, byte-wise otherwise.
pub fn compare(left: &Value, right: &Value) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => as_text(left).as_bytes().cmp(as_text(right).as_bytes()),
    }
}

/// Structural equality where numeric-looking scalars compare by value.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| loose_eq(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| loose_eq(a, b)))
        }
        (Value::Number(_) | Value::String(_), Value::Number(_) | Value::String(_)) => {
            match (as_number(left), as_number(right)) {
                (Some(l), Some(r)) => l == r,
                _ => left == right,
            }
        }
        _ => left == right,
    }
}

/// Render a value for a mismatch message: strings quoted verbatim, everything else as JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

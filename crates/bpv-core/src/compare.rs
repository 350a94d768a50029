//! # Deep Equality for Decoded Payloads
//!
//! Compares codec output against fixture expectations.
//!
//! - Primitives compare strictly. Numbers compare by value, so `25` equals
//!   `25.0`; a string `"25"` never equals the number `25`.
//! - Arrays are order-sensitive and must have the same length.
//! - Objects are order-insensitive on keys and must have the same key set.
//! - `null` equals only `null`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Name of a JSON value's type, as used in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Recursive structural equality with numeric-value comparison.
pub fn deep_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| deep_equal(v, other)))
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// The first place two values disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    /// Location in JSONPath-like notation, e.g. `$[0].value`.
    pub path: String,
    /// Value found in the actual output (`None` if the key is missing there).
    pub actual: Option<Value>,
    /// Value the fixture expects (`None` if the key is unexpected).
    pub expected: Option<Value>,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // JavaScript drops the fraction of whole numbers; print both sides as
        // floats when either one is, so `25` vs `25.1` reads `25.0` vs `25.1`.
        let float_pair = [&self.actual, &self.expected]
            .iter()
            .any(|v| matches!(v, Some(Value::Number(n)) if n.is_f64()));
        let show = |v: &Option<Value>| match v {
            Some(Value::Number(n)) if float_pair => match n.as_f64() {
                Some(x) => format!("{x:?}"),
                None => n.to_string(),
            },
            Some(v) => v.to_string(),
            None => "<absent>".to_string(),
        };
        write!(
            f,
            "at {}: actual {} != expected {}",
            self.path,
            show(&self.actual),
            show(&self.expected)
        )
    }
}

/// Locate the first difference between `actual` and `expected`.
///
/// Returns `None` exactly when [`deep_equal`] returns `true`.
pub fn first_difference(actual: &Value, expected: &Value) -> Option<Difference> {
    diff_at("$".to_string(), actual, expected)
}

fn diff_at(path: String, actual: &Value, expected: &Value) -> Option<Difference> {
    match (actual, expected) {
        (Value::Array(a), Value::Array(b)) => {
            for (i, (x, y)) in a.iter().zip(b).enumerate() {
                if let Some(d) = diff_at(format!("{path}[{i}]"), x, y) {
                    return Some(d);
                }
            }
            if a.len() != b.len() {
                let i = a.len().min(b.len());
                return Some(Difference {
                    path: format!("{path}[{i}]"),
                    actual: a.get(i).cloned(),
                    expected: b.get(i).cloned(),
                });
            }
            None
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let child = format!("{path}.{key}");
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => {
                        if let Some(d) = diff_at(child, x, y) {
                            return Some(d);
                        }
                    }
                    (x, y) => {
                        return Some(Difference {
                            path: child,
                            actual: x.cloned(),
                            expected: y.cloned(),
                        })
                    }
                }
            }
            None
        }
        _ if deep_equal(actual, expected) => None,
        _ => Some(Difference {
            path,
            actual: Some(actual.clone()),
            expected: Some(expected.clone()),
        }),
    }
}

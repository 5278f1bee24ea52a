//! Value codec between free-form attribute values and store primitives.
//!
//! The store only holds scalars. Composite values are kept as JSON text and
//! recovered on read by a best-effort heuristic:
//!
//! 1. text starting with `{` or `[` that parses as JSON becomes that JSON
//! 2. `true` / `false` (any case) become booleans
//! 3. integer text becomes an integer, then float text becomes a float
//! 4. anything else stays a string
//!
//! The decode is lossy: the attribute string `"42"` comes back as the
//! number `42`.

use serde_json::{Number, Value};
use tracing::warn;

/// A primitive the graph store can hold as a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl StoredValue {
    /// The JSON form of this primitive, as the store hands it back.
    pub fn to_json(&self) -> Value {
        match self {
            StoredValue::Bool(b) => Value::Bool(*b),
            StoredValue::Int(i) => Value::from(*i),
            StoredValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            StoredValue::Str(s) => Value::String(s.clone()),
        }
    }
}

/// Encode an attribute value for storage.
///
/// Returns `None` when the property must be omitted: `null`, blank strings,
/// and composites that fail to serialize.
pub fn encode(value: &Value) -> Option<StoredValue> {
    match value {
        Value::Array(_) | Value::Object(_) => match serde_json::to_string(value) {
            Ok(json) => Some(StoredValue::Str(json)),
            Err(err) => {
                warn!(error = %err, "Dropping attribute that failed to serialize");
                None
            }
        },
        scalar => encode_scalar(scalar),
    }
}

/// Encode a scalar attribute value; composites are dropped, not serialized.
pub fn encode_scalar(value: &Value) -> Option<StoredValue> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(StoredValue::Str(s.clone())),
        Value::Bool(b) => Some(StoredValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(StoredValue::Int(i)),
            None => n.as_f64().map(StoredValue::Float),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reconstruct an attribute value from a stored property.
///
/// Non-string values pass through unchanged.
pub fn decode(value: &Value) -> Value {
    match value {
        Value::String(s) => decode_str(s),
        other => other.clone(),
    }
}

/// Apply the string heuristic (JSON, boolean, integer, float, string).
pub fn decode_str(raw: &str) -> Value {
    if raw.starts_with('{') || raw.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
            return parsed;
        }
    }

    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    // NaN and infinities have no JSON form and stay text.
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }

    Value::String(raw.to_string())
}

/// Decode a property known to hold a JSON document.
///
/// Tolerates leading whitespace; falls back to [`decode`] when the text is
/// not valid JSON.
pub fn decode_json_field(value: &Value) -> Value {
    match value {
        Value::String(s) => serde_json::from_str(s.trim()).unwrap_or_else(|_| decode_str(s)),
        other => other.clone(),
    }
}

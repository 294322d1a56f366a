use serde_json::Value;

/// Turn an empty string into `Null`; every other value is returned as-is.
pub fn empty_to_null(value: Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::Null,
        other => other,
    }
}

/// Trim surrounding whitespace from a string value; non-strings are untouched.
pub fn trim_string(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_string())
            }
        }
        other => other,
    }
}

/// Serialize a list value to its JSON text, so it fits in a single TEXT column.
///
/// Anything that is not a list (including `Null`) passes through unchanged.
pub fn stringify_list(value: Value) -> Value {
    match value {
        Value::Array(_) => Value::String(value.to_string()),
        other => other,
    }
}

/// A hashable key for grouping on a JSON value.
///
/// Uses the JSON text, so the string `"1"` and the number `1` are different keys.
pub fn group_key(value: &Value) -> String {
    value.to_string()
}

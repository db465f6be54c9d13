//! The form value tree is plain JSON, the same shape the REST API speaks.

pub use serde_json::{Map, Value};

/// True for the values a `required` check rejects: absent, `null`, a string
/// that is blank after trimming, or an empty list.
#[must_use]
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// True when the value is absent or `null`.
#[must_use]
pub const fn is_undefined(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Blank strings submit as `null`.
#[must_use]
pub fn normalize_blank(value: Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        other => other,
    }
}

/// Short name of a value's JSON kind, for error messages.
#[must_use]
pub const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Truthiness used by condition branches reading toggle fields.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness_covers_blank_strings_and_empty_lists() {
        assert!(is_empty(None));
        assert!(is_empty(Some(&Value::Null)));
        assert!(is_empty(Some(&json!("   "))));
        assert!(is_empty(Some(&json!([]))));

        assert!(!is_empty(Some(&json!(0))));
        assert!(!is_empty(Some(&json!(false))));
        assert!(!is_empty(Some(&json!({}))));
    }

    #[test]
    fn normalize_blank_only_touches_blank_strings() {
        assert_eq!(normalize_blank(json!("  ")), Value::Null);
        assert_eq!(normalize_blank(json!(" x ")), json!(" x "));
        assert_eq!(normalize_blank(json!(3)), json!(3));
    }
}

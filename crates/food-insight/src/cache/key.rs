//! Deterministic cache-key construction.
//!
//! Keys embed caller-supplied text, so everything is sanitized before
//! JSON encoding: the result is stable for identical input and safe to
//! log. serde_json's default map keeps object keys sorted, which makes
//! the encoding order-independent.

use serde_json::{Map, Value};

/// Build a key from a method name and its parameters. The method name is
/// reduced to alphanumerics and underscores; parameters are recursively
/// sanitized.
pub fn build_key(method: &str, params: &Value) -> String {
    let method: String = method
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!("{method}:{}", sanitize(params))
}

/// Strings are stripped of unsafe characters; numbers, booleans, and null
/// pass through; arrays and objects are sanitized recursively.
fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(text) => Value::String(sanitize_text(text)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(sanitize_text(key), sanitize(item));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '.' | ','))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_input_builds_identical_keys() {
        let params = json!({"id": "p-1", "sugars_100g": 12.5});
        assert_eq!(build_key("analyze", &params), build_key("analyze", &params));
    }

    #[test]
    fn method_name_is_reduced_to_safe_characters() {
        let key = build_key("analyze/product!", &json!(null));
        assert!(key.starts_with("analyzeproduct:"));
    }

    #[test]
    fn unsafe_string_characters_are_stripped_recursively() {
        let key = build_key(
            "analyze",
            &json!({"name": "Choc'o<late>", "tags": ["a;b"]}),
        );
        assert!(key.contains("Chocolate"));
        assert!(key.contains("ab"));
        assert!(!key.contains('<') && !key.contains(';') && !key.contains('\''));
    }

    #[test]
    fn object_key_order_does_not_matter() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 2, "x": 1});
        assert_eq!(build_key("m", &a), build_key("m", &b));
    }
}

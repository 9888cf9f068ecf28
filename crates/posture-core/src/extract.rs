//! Named extraction strategies.
//!
//! Third-party payloads name the same concept differently across providers
//! and API revisions. Each alternative is a named strategy; strategies are
//! tried in priority order and the first one yielding a value wins.

use serde_json::Value;

pub type Strategy<S, T> = (&'static str, fn(&S) -> Option<T>);

pub fn first_match<S: ?Sized, T>(source: &S, strategies: &[Strategy<S, T>]) -> Option<T> {
    first_match_named(source, strategies).map(|(_, v)| v)
}

/// Like [`first_match`] but also reports which strategy produced the value.
pub fn first_match_named<S: ?Sized, T>(
    source: &S,
    strategies: &[Strategy<S, T>],
) -> Option<(&'static str, T)> {
    strategies
        .iter()
        .find_map(|(name, strategy)| strategy(source).map(|v| (*name, v)))
}

/// Non-empty string at a JSON pointer.
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Non-empty array at a JSON pointer.
pub fn array_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a Vec<Value>> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty())
}

/// Renders a scalar JSON value as text: strings verbatim, numbers and bools
/// via their JSON form.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn earlier_strategy_wins() {
        let doc = json!({"primary": "a", "secondary": "b"});
        let strategies: [Strategy<Value, String>; 2] = [
            ("primary", |v| str_at(v, "/primary").map(String::from)),
            ("secondary", |v| str_at(v, "/secondary").map(String::from)),
        ];
        assert_eq!(
            first_match_named(&doc, &strategies),
            Some(("primary", "a".to_string()))
        );
    }

    #[test]
    fn falls_through_to_later_strategy() {
        let doc = json!({"primary": "", "secondary": "b"});
        let strategies: [Strategy<Value, String>; 2] = [
            ("primary", |v| str_at(v, "/primary").map(String::from)),
            ("secondary", |v| str_at(v, "/secondary").map(String::from)),
        ];
        assert_eq!(first_match(&doc, &strategies), Some("b".to_string()));
    }

    #[test]
    fn no_strategy_matches() {
        let doc = json!({});
        let strategies: [Strategy<Value, String>; 1] =
            [("primary", |v| str_at(v, "/primary").map(String::from))];
        assert_eq!(first_match(&doc, &strategies), None);
    }

    #[test]
    fn array_at_skips_empty_arrays() {
        let doc = json!({"a": [], "b": [1]});
        assert!(array_at(&doc, "/a").is_none());
        assert_eq!(array_at(&doc, "/b").map(Vec::len), Some(1));
    }
}

//! Purpose: The decoding protocol domain types implement, plus field helpers.
//! Exports: `Decode`, `FromJson`, `required`, `optional`.
//! Role: Sole contract between the pipeline and concrete domain types.
//! Invariants: Construction is all-or-nothing; a target is never partially
//! Invariants: populated from a JSON object.
//! Invariants: `optional` keeps "key absent" distinct from "key present with
//! Invariants: the wrong shape" — only the latter fails a decode.

use super::combinator::{bind, map};
use serde_json::{Map, Value};

/// Capability to attempt construction from a parsed JSON value.
///
/// Returning `None` means the value does not have the shape this type
/// requires; the pipeline turns that into a decode-stage error naming the
/// target type.
pub trait Decode: Sized {
    fn decode(value: &Value) -> Option<Self>;
}

/// Semantic coercion from a single JSON node.
pub trait FromJson: Sized {
    fn from_json(value: &Value) -> Option<Self>;
}

impl FromJson for i64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromJson for u64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromJson for f64 {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromJson for bool {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromJson for String {
    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromJson for Value {
    fn from_json(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        items.iter().map(T::from_json).collect()
    }
}

/// Looks up `key` and coerces it. Missing key or failed coercion both yield
/// `None`, failing the enclosing decode.
pub fn required<T: FromJson>(object: &Map<String, Value>, key: &str) -> Option<T> {
    bind(object.get(key), |value| T::from_json(value))
}

/// Looks up `key` with two-level optionality. An absent key is a successful
/// `Some(None)`; a present key that fails coercion is `None` and fails the
/// enclosing decode.
pub fn optional<T: FromJson>(object: &Map<String, Value>, key: &str) -> Option<Option<T>> {
    match object.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(value) => map(Some, T::from_json(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::{FromJson, optional, required};
    use serde_json::{Map, Value, json};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn required_coerces_present_fields() {
        let obj = object(json!({"id": 7, "name": "Ada", "score": 1.5, "admin": true}));
        assert_eq!(required::<i64>(&obj, "id"), Some(7));
        assert_eq!(required::<String>(&obj, "name"), Some("Ada".to_string()));
        assert_eq!(required::<f64>(&obj, "score"), Some(1.5));
        assert_eq!(required::<bool>(&obj, "admin"), Some(true));
    }

    #[test]
    fn required_fails_on_missing_or_mistyped_fields() {
        let obj = object(json!({"id": "not a number"}));
        assert_eq!(required::<i64>(&obj, "id"), None);
        assert_eq!(required::<i64>(&obj, "absent"), None);
    }

    #[test]
    fn optional_distinguishes_absent_from_mistyped() {
        let obj = object(json!({"email": 42}));
        // Absent key: successfully absent.
        assert_eq!(optional::<String>(&obj, "nickname"), Some(None));
        // Present with the wrong shape: the decode must fail.
        assert_eq!(optional::<String>(&obj, "email"), None);
    }

    #[test]
    fn optional_treats_null_as_absent() {
        let obj = object(json!({"email": null}));
        assert_eq!(optional::<String>(&obj, "email"), Some(None));
    }

    #[test]
    fn vec_coercion_is_all_or_nothing() {
        let ok = json!([1, 2, 3]);
        let mixed = json!([1, "two", 3]);
        assert_eq!(Vec::<i64>::from_json(&ok), Some(vec![1, 2, 3]));
        assert_eq!(Vec::<i64>::from_json(&mixed), None);
    }
}

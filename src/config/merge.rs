//! Deep merge for tree-shaped configurations.
//!
//! Higher-precedence values override lower-precedence values field by field.
//! Arrays are replaced entirely, not concatenated.

use serde_json::Value;

/// Deep merge `overlay` into `base` in place, with `overlay` taking precedence.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Keys missing from overlay are kept
/// - Arrays, strings, numbers and booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use config_resolver::config::deep_merge;
///
/// let mut base = json!({
///     "server": { "port": 8080, "host": "localhost" },
///     "features": ["a", "b"]
/// });
/// deep_merge(&mut base, json!({
///     "server": { "port": 9000 },
///     "features": ["c"]
/// }));
/// assert_eq!(base, json!({
///     "server": { "port": 9000, "host": "localhost" },
///     "features": ["c"]
/// }));
/// ```
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged(mut base: Value, overlay: Value) -> Value {
        deep_merge(&mut base, overlay);
        base
    }

    #[test]
    fn test_merge_simple_objects() {
        let result = merged(json!({"a": 1, "b": 2}), json!({"b": 3, "c": 4}));
        assert_eq!(result, json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_is_order_sensitive() {
        let result = merged(json!({"b": 3, "c": 4}), json!({"a": 1, "b": 2}));
        assert_eq!(result, json!({"a": 1, "b": 2, "c": 4}));
    }

    #[test]
    fn test_merge_nested_sections() {
        let base = json!({
            "section1": {"var1": "foo", "var2": "bar"},
            "section2": {"var1": "baz"}
        });
        let overlay = json!({
            "section1": {"var1": "frob"},
            "section3": {"var1": "Hello World!"}
        });
        assert_eq!(
            merged(base, overlay),
            json!({
                "section1": {"var1": "frob", "var2": "bar"},
                "section2": {"var1": "baz"},
                "section3": {"var1": "Hello World!"}
            })
        );
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let result = merged(json!({"items": [1, 2, 3]}), json!({"items": [4, 5]}));
        assert_eq!(result, json!({"items": [4, 5]}));
    }

    #[test]
    fn test_null_preserves_base() {
        let result = merged(json!({"a": 1, "b": {"c": 2}}), json!({"a": null, "b": {"c": null}}));
        assert_eq!(result, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn test_overlay_replaces_primitive_with_object() {
        let result = merged(json!({"value": 42}), json!({"value": {"nested": true}}));
        assert_eq!(result, json!({"value": {"nested": true}}));
    }

    #[test]
    fn test_overlay_replaces_object_with_primitive() {
        let result = merged(json!({"value": {"nested": true}}), json!({"value": 42}));
        assert_eq!(result, json!({"value": 42}));
    }
}

use serde_json::Value as JsonValue;

/// Maximum container nesting of `value`.
///
/// Scalars and `null` are 0; an array or object is one more than its deepest
/// element or value, so `[]` and `{}` are 1.
///
/// Recurses once per level. Run it on values that already passed
/// [`sanitize_value`](super::sanitize_value), whose breaker bounds the walk.
pub fn json_depth(value: &JsonValue) -> usize {
    match value {
        JsonValue::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        JsonValue::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

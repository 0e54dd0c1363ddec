//! JSON sanitization against prototype-pollution keys and runaway nesting.
//!
//! Every object in the input is rebuilt into a fresh [`serde_json::Map`] that
//! holds only the keys explicitly copied from the source. A map has no
//! fallback lookup chain, so `get("__proto__")` on a sanitized object is always
//! `None`.
//!
//! # Pollution keys
//!
//! The following keys are dropped at every nesting level (exact match, no
//! Unicode normalization):
//! - `__proto__`
//! - `constructor`
//! - `prototype`
//!
//! Array indices are never stripped; arrays keep their order and length.
//!
//! # Depth
//!
//! Depth is counted in containers: a scalar is 0, `[]` and `{}` are 1, and
//! every array element or object value one level further down adds 1.
//!
//! The walk trips a circuit breaker ([`SANITIZE_CIRCUIT_BREAKER_DEPTH`] unless
//! overridden) when the input nests deeper than allowed. That breaker only
//! guards the stack. Callers enforce their own policy afterwards with
//! [`json_depth`], which the loader does with `max_json_depth`.

mod depth;
mod keys;
mod parse;

#[cfg(test)]
mod tests;

pub use depth::json_depth;
pub use keys::{is_pollution_key, POLLUTION_KEYS};
pub(crate) use parse::parse_bounded;

use serde_json::{Map, Value as JsonValue};

use crate::error::{LoaderError, LoaderResult};

/// Default recursion bound for the sanitizer walk.
pub const SANITIZE_CIRCUIT_BREAKER_DEPTH: usize = 1_000;

/// Options for a sanitizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Deepest container nesting the walk will descend into.
    pub max_depth: usize,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            max_depth: SANITIZE_CIRCUIT_BREAKER_DEPTH,
        }
    }
}

impl SanitizeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Build a sanitized copy of `value`.
///
/// The result shares no allocation with the input. Fails with
/// [`LoaderError::DepthSanitationExceeded`] when the input nests deeper than
/// `options.max_depth`.
pub fn sanitize_value(value: &JsonValue, options: SanitizeOptions) -> LoaderResult<JsonValue> {
    sanitize_node(value, 0, options.max_depth)
}

/// Parse `raw` as JSON, then sanitize it.
///
/// Nesting is bounded by `options.max_depth` alone; serde_json's own
/// 128-level limit does not apply. Input nested deeper than the bound fails
/// with [`LoaderError::DepthSanitationExceeded`] before a tree is built.
///
/// ```
/// use safe_json_loader::{parse_and_sanitize, SanitizeOptions};
///
/// let value = parse_and_sanitize(
///     r#"{"user":{"__proto__":{"isAdmin":true}}}"#,
///     SanitizeOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(value, serde_json::json!({"user": {}}));
/// ```
pub fn parse_and_sanitize(raw: &str, options: SanitizeOptions) -> LoaderResult<JsonValue> {
    let parsed = parse_bounded(raw.as_bytes(), options.max_depth, |e| {
        LoaderError::JsonParse {
            message: e.to_string(),
        }
    })?;
    sanitize_value(&parsed, options)
}

fn sanitize_node(value: &JsonValue, depth: usize, max_depth: usize) -> LoaderResult<JsonValue> {
    match value {
        JsonValue::Array(items) => {
            let depth = descend(depth, max_depth)?;
            let items: LoaderResult<Vec<JsonValue>> = items
                .iter()
                .map(|item| sanitize_node(item, depth, max_depth))
                .collect();
            Ok(JsonValue::Array(items?))
        }

        JsonValue::Object(map) => {
            let depth = descend(depth, max_depth)?;
            let mut rebuilt = Map::with_capacity(map.len());
            for (key, child) in map {
                if is_pollution_key(key) {
                    continue;
                }
                rebuilt.insert(key.clone(), sanitize_node(child, depth, max_depth)?);
            }
            Ok(JsonValue::Object(rebuilt))
        }

        scalar => Ok(scalar.clone()),
    }
}

/// Enter one container level, tripping the breaker past `max_depth`.
fn descend(depth: usize, max_depth: usize) -> LoaderResult<usize> {
    let next = depth + 1;
    if next > max_depth {
        return Err(LoaderError::DepthSanitationExceeded { limit: max_depth });
    }
    Ok(next)
}

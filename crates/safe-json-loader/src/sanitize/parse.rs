//! Depth-bounded JSON parsing.
//!
//! serde_json stops at 128 levels unless its recursion limit is disabled. The
//! limit is disabled here and replaced by the sanitizer breaker: raw bytes are
//! scanned for bracket nesting first (iteratively, nothing is allocated), so
//! input past the breaker is refused before a tree is built. Parsing itself
//! runs on a growable stack through `serde_stacker`.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{LoaderError, LoaderResult};

/// Parse `bytes` into a value nested at most `max_depth` containers deep.
///
/// Syntax errors are handed to `on_syntax` so each reader reports its own
/// error code. Nesting past `max_depth` is a
/// [`LoaderError::DepthSanitationExceeded`].
pub(crate) fn parse_bounded<F>(
    bytes: &[u8],
    max_depth: usize,
    on_syntax: F,
) -> LoaderResult<JsonValue>
where
    F: FnOnce(serde_json::Error) -> LoaderError,
{
    if nesting_exceeds(bytes, max_depth) {
        return Err(LoaderError::DepthSanitationExceeded { limit: max_depth });
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();

    let parsed = JsonValue::deserialize(serde_stacker::Deserializer::new(&mut deserializer));
    parsed
        .and_then(|value| deserializer.end().map(|()| value))
        .map_err(on_syntax)
}

/// Whether `[`/`{` nesting outside string literals goes past `limit`.
///
/// For valid JSON the maximum nesting equals [`json_depth`](super::json_depth)
/// of the parsed value.
fn nesting_exceeds(bytes: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &byte in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    false
}

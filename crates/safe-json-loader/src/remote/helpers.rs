//! Pure helpers: content-type matching and index detection (no HTTP).

use serde_json::Value as JsonValue;

/// Canonical JSON media type.
pub(crate) const JSON_MEDIA_TYPE: &str = "application/json";

/// Whether a `Content-Type` header value announces JSON.
///
/// Loose mode accepts anything mentioning `json` (`application/ld+json`,
/// `text/json`, …). Strict mode requires the media type to be exactly
/// `application/json`; parameters such as `charset` are ignored.
pub(crate) fn content_type_is_json(content_type: &str, loose: bool) -> bool {
    if loose {
        return content_type.to_ascii_lowercase().contains("json");
    }
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|media_type| media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

/// What a fetched top-level document turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DocumentKind {
    /// Array, or object with a `files` array: string entries only.
    Index(Vec<String>),

    /// Anything else.
    Terminal,
}

/// Decide whether `value` is an index of further URLs.
///
/// Non-string entries are dropped. An object whose `files` member is present
/// but not an array is rejected with a description of the problem.
pub(crate) fn classify_document(value: &JsonValue) -> Result<DocumentKind, String> {
    let entries = match value {
        JsonValue::Array(entries) => entries,
        JsonValue::Object(map) => match map.get("files") {
            Some(JsonValue::Array(entries)) => entries,
            Some(other) => {
                return Err(format!(
                    "`files` must be an array of URLs, found {}",
                    json_type_name(other)
                ))
            }
            None => return Ok(DocumentKind::Terminal),
        },
        _ => return Ok(DocumentKind::Terminal),
    };

    Ok(DocumentKind::Index(
        entries
            .iter()
            .filter_map(|entry| entry.as_str().map(String::from))
            .collect(),
    ))
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

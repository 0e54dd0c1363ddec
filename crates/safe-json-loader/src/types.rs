//! Records produced by the loader.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// A sanitized JSON document and where it came from.
///
/// Fields are read-only; the record is built once by the loader and handed to
/// the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedFile {
    name: String,
    data: JsonValue,
    source: String,
}

impl LoadedFile {
    pub(crate) fn new(name: impl Into<String>, data: JsonValue, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data,
            source: source.into(),
        }
    }

    /// Display name: the file basename or the last URL path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sanitized content.
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// Absolute path or URL the content was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Take ownership of the sanitized content.
    pub fn into_data(self) -> JsonValue {
        self.data
    }
}

/// A file excluded by a size policy, reported before the load fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Absolute path or URL.
    pub source: String,

    /// Human-readable reason.
    pub reason: String,
}

impl SkippedFile {
    pub(crate) fn too_large(source: impl Into<String>, size: Option<u64>, limit: u64) -> Self {
        let reason = match size {
            Some(size) => format!("size {} bytes exceeds limit {} bytes", size, limit),
            None => format!("size exceeds limit {} bytes", limit),
        };
        Self {
            source: source.into(),
            reason,
        }
    }

    pub(crate) fn total_exceeded(source: impl Into<String>, total: u64, limit: u64) -> Self {
        Self {
            source: source.into(),
            reason: format!(
                "running directory total {} bytes exceeds limit {} bytes",
                total, limit
            ),
        }
    }
}

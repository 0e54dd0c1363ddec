//! Input classification.
//!
//! - `https://host/data.json`, `http://…` → remote document or index
//! - anything else → local file or directory path

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{LoaderError, LoaderResult};

/// Where the loader should read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// HTTP(S) URL.
    Remote(Url),

    /// Local path, made absolute against the current directory.
    Local(PathBuf),
}

impl Source {
    /// Classify an input string.
    ///
    /// Surrounding whitespace is ignored when deciding whether the input is
    /// blank or a URL. A local path is taken verbatim, so file names that start
    /// or end with spaces still resolve.
    ///
    /// # Examples
    ///
    /// ```
    /// use safe_json_loader::Source;
    ///
    /// let remote = Source::classify("https://example.com/data.json").unwrap();
    /// assert!(matches!(remote, Source::Remote(_)));
    ///
    /// let local = Source::classify("./fixtures").unwrap();
    /// assert!(matches!(local, Source::Local(_)));
    ///
    /// assert!(Source::classify("   ").is_err());
    /// ```
    pub fn classify(input: &str) -> LoaderResult<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(LoaderError::InputValidation {
                message: "input must be a non-empty path or URL".to_string(),
            });
        }

        if has_http_scheme(trimmed) {
            let url = Url::parse(trimmed).map_err(|e| LoaderError::InputValidation {
                message: format!("invalid URL {}: {}", trimmed, e),
            })?;
            return Ok(Self::Remote(url));
        }

        let path = std::path::absolute(Path::new(input)).map_err(|e| {
            LoaderError::InputValidation {
                message: format!("cannot resolve path {}: {}", input, e),
            }
        })?;
        Ok(Self::Local(path))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{}", url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Case-insensitive `http://` / `https://` prefix test.
pub(crate) fn has_http_scheme(input: &str) -> bool {
    let lower = input
        .get(..8)
        .unwrap_or(input)
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parse an index entry as an absolute HTTP(S) URL with a host.
pub(crate) fn parse_http_url(entry: &str) -> Option<Url> {
    if !has_http_scheme(entry) {
        return None;
    }
    let url = Url::parse(entry).ok()?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Some(url),
        _ => None,
    }
}

/// Display name for a path: its final component.
pub(crate) fn path_basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Display name for a URL: the last non-empty path segment, else the host.
pub(crate) fn url_basename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(String::from)
        .or_else(|| url.host_str().map(String::from))
        .unwrap_or_else(|| url.to_string())
}

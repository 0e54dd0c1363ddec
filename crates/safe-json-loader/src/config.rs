//! Loader options and their resolved form.
//!
//! Callers describe overrides with [`LoaderOptions`]; every field is optional.
//! Each call to the loader resolves them once into a [`LoaderConfig`] with all
//! defaults filled in. The resolved config is shared read-only by every task of
//! that call.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SAFE_JSON_MAX_FILES` | Max files per directory or index (default: 100) |
//! | `SAFE_JSON_MAX_TOTAL_BYTES` | Max bytes per directory (default: 10 MiB) |
//! | `SAFE_JSON_MAX_FILE_BYTES` | Max bytes per file or response (default: 2 MiB) |
//! | `SAFE_JSON_HTTP_TIMEOUT_MS` | Request timeout in milliseconds (default: 8000) |
//! | `SAFE_JSON_MAX_CONCURRENCY` | Max in-flight loads (default: 5) |
//! | `SAFE_JSON_LOOSE_CONTENT_TYPE` | Accept any content-type containing `json` (default: true) |
//! | `SAFE_JSON_MAX_JSON_DEPTH` | Max nesting depth of a document (default: 50) |

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::logger::{NoopLogger, SharedLogger};
use crate::sanitize::SanitizeOptions;
use crate::types::{LoadedFile, SkippedFile};

pub const DEFAULT_MAX_FILES: usize = 100;
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 10 * 1_024 * 1_024;
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1_024 * 1_024;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
pub const DEFAULT_LOOSE_CONTENT_TYPE: bool = true;
pub const DEFAULT_MAX_JSON_DEPTH: usize = 50;

/// Called once per successfully loaded file.
pub type FileLoadedHook = Arc<dyn Fn(&LoadedFile) + Send + Sync>;

/// Called when a file is excluded by a size policy.
pub type FileSkippedHook = Arc<dyn Fn(&SkippedFile) + Send + Sync>;

/// Caller overrides. Unset fields fall back to the defaults.
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderOptions {
    pub max_files: Option<usize>,
    pub max_total_bytes: Option<u64>,
    pub max_file_bytes: Option<u64>,
    pub http_timeout_ms: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub loose_content_type: Option<bool>,
    pub max_json_depth: Option<usize>,

    #[serde(skip)]
    pub on_file_loaded: Option<FileLoadedHook>,

    #[serde(skip)]
    pub on_file_skipped: Option<FileSkippedHook>,

    #[serde(skip)]
    pub logger: Option<SharedLogger>,
}

impl std::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("max_files", &self.max_files)
            .field("max_total_bytes", &self.max_total_bytes)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("max_concurrency", &self.max_concurrency)
            .field("loose_content_type", &self.loose_content_type)
            .field("max_json_depth", &self.max_json_depth)
            .field("on_file_loaded", &self.on_file_loaded.is_some())
            .field("on_file_skipped", &self.on_file_skipped.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl LoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read limits from `SAFE_JSON_*` environment variables.
    ///
    /// Variables that are missing or fail to parse stay unset.
    pub fn from_env() -> Self {
        Self {
            max_files: env_parse("SAFE_JSON_MAX_FILES"),
            max_total_bytes: env_parse("SAFE_JSON_MAX_TOTAL_BYTES"),
            max_file_bytes: env_parse("SAFE_JSON_MAX_FILE_BYTES"),
            http_timeout_ms: env_parse("SAFE_JSON_HTTP_TIMEOUT_MS"),
            max_concurrency: env_parse("SAFE_JSON_MAX_CONCURRENCY"),
            loose_content_type: std::env::var("SAFE_JSON_LOOSE_CONTENT_TYPE")
                .ok()
                .and_then(|v| parse_flag(&v)),
            max_json_depth: env_parse("SAFE_JSON_MAX_JSON_DEPTH"),
            ..Default::default()
        }
    }

    /// Overlay `overrides` on `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: LoaderOptions) -> Self {
        Self {
            max_files: overrides.max_files.or(self.max_files),
            max_total_bytes: overrides.max_total_bytes.or(self.max_total_bytes),
            max_file_bytes: overrides.max_file_bytes.or(self.max_file_bytes),
            http_timeout_ms: overrides.http_timeout_ms.or(self.http_timeout_ms),
            max_concurrency: overrides.max_concurrency.or(self.max_concurrency),
            loose_content_type: overrides.loose_content_type.or(self.loose_content_type),
            max_json_depth: overrides.max_json_depth.or(self.max_json_depth),
            on_file_loaded: overrides.on_file_loaded.or(self.on_file_loaded),
            on_file_skipped: overrides.on_file_skipped.or(self.on_file_skipped),
            logger: overrides.logger.or(self.logger),
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = Some(max_files);
        self
    }

    pub fn with_max_total_bytes(mut self, bytes: u64) -> Self {
        self.max_total_bytes = Some(bytes);
        self
    }

    pub fn with_max_file_bytes(mut self, bytes: u64) -> Self {
        self.max_file_bytes = Some(bytes);
        self
    }

    pub fn with_http_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.http_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    /// `true` accepts any content-type mentioning `json`; `false` requires the
    /// media type `application/json`. Parameters such as `charset` are ignored
    /// in both modes.
    pub fn with_loose_content_type(mut self, loose: bool) -> Self {
        self.loose_content_type = Some(loose);
        self
    }

    /// Deepest container nesting a document may have after sanitization.
    ///
    /// Documents nested past
    /// [`SANITIZE_CIRCUIT_BREAKER_DEPTH`](crate::SANITIZE_CIRCUIT_BREAKER_DEPTH)
    /// fail with `DEPTH_SANITATION_EXCEEDED` whatever this is set to.
    pub fn with_max_json_depth(mut self, depth: usize) -> Self {
        self.max_json_depth = Some(depth);
        self
    }

    pub fn on_file_loaded<F>(mut self, hook: F) -> Self
    where
        F: Fn(&LoadedFile) + Send + Sync + 'static,
    {
        self.on_file_loaded = Some(Arc::new(hook));
        self
    }

    pub fn on_file_skipped<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SkippedFile) + Send + Sync + 'static,
    {
        self.on_file_skipped = Some(Arc::new(hook));
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    let value = value.trim();
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Fully resolved loader configuration.
#[derive(Clone)]
pub struct LoaderConfig {
    /// Max JSON files in a directory or URLs in an index.
    pub max_files: usize,

    /// Max combined size of a directory's JSON files.
    pub max_total_bytes: u64,

    /// Max size of a single file or response body.
    pub max_file_bytes: u64,

    /// Per-request timeout.
    pub http_timeout_ms: u64,

    /// Max loads in flight at once. Always at least 1.
    pub max_concurrency: usize,

    /// Accept any content-type containing `json` instead of exactly
    /// `application/json`.
    pub loose_content_type: bool,

    /// Max nesting depth of a loaded document.
    pub max_json_depth: usize,

    pub on_file_loaded: Option<FileLoadedHook>,

    pub on_file_skipped: Option<FileSkippedHook>,

    pub logger: SharedLogger,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::resolve(LoaderOptions::default())
    }
}

impl std::fmt::Debug for LoaderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("max_files", &self.max_files)
            .field("max_total_bytes", &self.max_total_bytes)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("max_concurrency", &self.max_concurrency)
            .field("loose_content_type", &self.loose_content_type)
            .field("max_json_depth", &self.max_json_depth)
            .finish_non_exhaustive()
    }
}

impl From<LoaderOptions> for LoaderConfig {
    fn from(options: LoaderOptions) -> Self {
        Self::resolve(options)
    }
}

impl LoaderConfig {
    /// Fill every unset option with its default.
    pub fn resolve(options: LoaderOptions) -> Self {
        Self {
            max_files: options.max_files.unwrap_or(DEFAULT_MAX_FILES),
            max_total_bytes: options.max_total_bytes.unwrap_or(DEFAULT_MAX_TOTAL_BYTES),
            max_file_bytes: options.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
            http_timeout_ms: options.http_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS),
            max_concurrency: options
                .max_concurrency
                .unwrap_or(DEFAULT_MAX_CONCURRENCY)
                .max(1),
            loose_content_type: options
                .loose_content_type
                .unwrap_or(DEFAULT_LOOSE_CONTENT_TYPE),
            max_json_depth: options.max_json_depth.unwrap_or(DEFAULT_MAX_JSON_DEPTH),
            on_file_loaded: options.on_file_loaded,
            on_file_skipped: options.on_file_skipped,
            logger: options.logger.unwrap_or_else(|| Arc::new(NoopLogger)),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Sanitizer options for loaded documents: always the circuit breaker.
    ///
    /// `max_json_depth` is checked separately on the sanitized result.
    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions::default()
    }

    pub(crate) fn notify_loaded(&self, file: &LoadedFile) {
        if let Some(hook) = &self.on_file_loaded {
            hook(file);
        }
    }

    pub(crate) fn notify_skipped(&self, skipped: &SkippedFile) {
        if let Some(hook) = &self.on_file_skipped {
            hook(skipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ENV_VARS: &[&str] = &[
        "SAFE_JSON_MAX_FILES",
        "SAFE_JSON_MAX_TOTAL_BYTES",
        "SAFE_JSON_MAX_FILE_BYTES",
        "SAFE_JSON_HTTP_TIMEOUT_MS",
        "SAFE_JSON_MAX_CONCURRENCY",
        "SAFE_JSON_LOOSE_CONTENT_TYPE",
        "SAFE_JSON_MAX_JSON_DEPTH",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.max_files, 100);
        assert_eq!(config.max_total_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_file_bytes, 2 * 1024 * 1024);
        assert_eq!(config.http_timeout_ms, 8000);
        assert_eq!(config.http_timeout(), Duration::from_secs(8));
        assert_eq!(config.max_concurrency, 5);
        assert!(config.loose_content_type);
        assert_eq!(config.max_json_depth, 50);
        assert!(config.on_file_loaded.is_none());
        assert!(config.on_file_skipped.is_none());
    }

    #[test]
    fn test_overrides_win() {
        let config = LoaderConfig::resolve(
            LoaderOptions::new()
                .with_max_files(3)
                .with_max_file_bytes(64)
                .with_loose_content_type(false)
                .with_max_json_depth(4),
        );
        assert_eq!(config.max_files, 3);
        assert_eq!(config.max_file_bytes, 64);
        assert!(!config.loose_content_type);
        assert_eq!(config.max_json_depth, 4);
        assert_eq!(config.max_total_bytes, DEFAULT_MAX_TOTAL_BYTES);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let config = LoaderConfig::resolve(LoaderOptions::new().with_max_concurrency(0));
        assert_eq!(config.max_concurrency, 1);
    }

    #[test]
    fn test_hooks_are_carried_through() {
        let loaded = Arc::new(AtomicUsize::new(0));
        let counter = loaded.clone();
        let config = LoaderConfig::resolve(LoaderOptions::new().on_file_loaded(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let file = LoadedFile::new("a.json", serde_json::json!({}), "/a.json");
        config.notify_loaded(&file);
        config.notify_skipped(&SkippedFile::too_large("/b.json", Some(2), 1));
        assert_eq!(loaded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = LoaderOptions::new().with_max_files(10).with_max_json_depth(5);
        let merged = base.merge(LoaderOptions::new().with_max_files(2));
        assert_eq!(merged.max_files, Some(2));
        assert_eq!(merged.max_json_depth, Some(5));
    }

    #[test]
    fn test_deserialize_partial_options() {
        let options: LoaderOptions =
            serde_json::from_str(r#"{"max_files": 7, "loose_content_type": false}"#).unwrap();
        assert_eq!(options.max_files, Some(7));
        assert_eq!(options.loose_content_type, Some(false));
        assert!(options.max_file_bytes.is_none());

        let err = serde_json::from_str::<LoaderOptions>(r#"{"max_filez": 7}"#);
        assert!(err.is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var("SAFE_JSON_MAX_FILES", "12");
        std::env::set_var("SAFE_JSON_HTTP_TIMEOUT_MS", "250");
        std::env::set_var("SAFE_JSON_LOOSE_CONTENT_TYPE", "false");
        std::env::set_var("SAFE_JSON_MAX_JSON_DEPTH", "not-a-number");

        let options = LoaderOptions::from_env();
        clear_env();

        assert_eq!(options.max_files, Some(12));
        assert_eq!(options.http_timeout_ms, Some(250));
        assert_eq!(options.loose_content_type, Some(false));
        assert!(options.max_json_depth.is_none());
        assert!(options.max_concurrency.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_empty() {
        clear_env();
        let config = LoaderConfig::resolve(LoaderOptions::from_env());
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }
}

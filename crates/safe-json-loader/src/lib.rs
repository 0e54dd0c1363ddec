//! Safe loading of untrusted JSON from local files, directories and HTTP(S).
//!
//! Every document is parsed and then rebuilt without prototype-pollution keys
//! (`__proto__`, `constructor`, `prototype`) at any depth. Loads are bounded
//! by file count, per-file bytes, aggregate bytes, nesting depth, HTTP timeout
//! and parallelism:
//!
//! - Sanitizer for already parsed values or raw strings
//! - Local reader for a single `.json` file or a directory of them
//! - Remote reader for a single document or an index of document URLs
//! - Bounded fan-out with FIFO admission
//!
//! # Quick Start
//!
//! ```no_run
//! use safe_json_loader::{load_safe_json_resources, LoaderOptions, TracingLogger};
//! use std::sync::Arc;
//!
//! # async fn example() -> safe_json_loader::LoaderResult<()> {
//! let options = LoaderOptions::from_env()
//!     .with_max_concurrency(8)
//!     .with_logger(Arc::new(TracingLogger))
//!     .on_file_skipped(|skipped| eprintln!("skipped {}: {}", skipped.source, skipped.reason));
//!
//! let files = load_safe_json_resources("https://example.com/index.json", options).await?;
//! for file in files {
//!     println!("{} ({})", file.name(), file.source());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! All failures are [`LoaderError`] values; [`LoaderError::code`] gives a
//! stable [`ErrorCode`]. Nothing is retried and a batch is all-or-nothing.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SAFE_JSON_MAX_FILES` | Max files per directory or index (default: 100) |
//! | `SAFE_JSON_MAX_TOTAL_BYTES` | Max aggregate directory bytes (default: 10 MiB) |
//! | `SAFE_JSON_MAX_FILE_BYTES` | Max bytes per file or response (default: 2 MiB) |
//! | `SAFE_JSON_HTTP_TIMEOUT_MS` | Per-request timeout in milliseconds (default: 8000) |
//! | `SAFE_JSON_MAX_CONCURRENCY` | Max loads in flight (default: 5) |
//! | `SAFE_JSON_LOOSE_CONTENT_TYPE` | Accept any content type mentioning `json` (default: true) |
//! | `SAFE_JSON_MAX_JSON_DEPTH` | Max nesting depth after sanitization (default: 50) |

pub mod config;
pub mod error;
pub mod limiter;
mod loader;
mod local;
pub mod logger;
mod remote;
pub mod sanitize;
pub mod source;
pub mod types;

// Re-export main types
pub use config::{
    FileLoadedHook, FileSkippedHook, LoaderConfig, LoaderOptions, DEFAULT_HTTP_TIMEOUT_MS,
    DEFAULT_LOOSE_CONTENT_TYPE, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_FILES,
    DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_JSON_DEPTH, DEFAULT_MAX_TOTAL_BYTES,
};
pub use error::{ErrorCode, LoaderError, LoaderResult};
pub use limiter::ConcurrencyLimiter;
pub use loader::{load_safe_json_resources, load_safe_json_resources_with_config};
pub use logger::{LogLevel, Logger, NoopLogger, SharedLogger, TracingLogger};
pub use sanitize::{
    is_pollution_key, json_depth, parse_and_sanitize, sanitize_value, SanitizeOptions,
    POLLUTION_KEYS, SANITIZE_CIRCUIT_BREAKER_DEPTH,
};
pub use source::Source;
pub use types::{LoadedFile, SkippedFile};

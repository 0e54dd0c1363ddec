//! Error types for the loader.
//!
//! Every failure is a [`LoaderError`]. Callers that need to branch on the
//! failure kind should match on [`LoaderError::code`], which is stable across
//! releases; the `Display` text is for humans only.

use serde::Serialize;

/// Stable, machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InputValidationError,
    DepthSanitationExceeded,
    JsonParseError,
    LocalPathNotFound,
    LocalPathTypeError,
    LocalFileExtensionError,
    LocalFileTooLarge,
    LocalJsonParseError,
    LocalJsonDepthExceeded,
    LocalDirTooManyFiles,
    LocalDirTotalTooLarge,
    LocalIoError,
    RemoteFetchError,
    RemoteFetchStatusError,
    RemoteContentTypeError,
    RemoteFileTooLarge,
    RemoteJsonParseError,
    RemoteJsonDepthExceeded,
    RemoteIndexTooManyFiles,
    RemoteIndexInvalidUrl,
    RemoteIndexInvalidFormat,
    ConcurrencyError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputValidationError => "INPUT_VALIDATION_ERROR",
            Self::DepthSanitationExceeded => "DEPTH_SANITATION_EXCEEDED",
            Self::JsonParseError => "JSON_PARSE_ERROR",
            Self::LocalPathNotFound => "LOCAL_PATH_NOT_FOUND",
            Self::LocalPathTypeError => "LOCAL_PATH_TYPE_ERROR",
            Self::LocalFileExtensionError => "LOCAL_FILE_EXTENSION_ERROR",
            Self::LocalFileTooLarge => "LOCAL_FILE_TOO_LARGE",
            Self::LocalJsonParseError => "LOCAL_JSON_PARSE_ERROR",
            Self::LocalJsonDepthExceeded => "LOCAL_JSON_DEPTH_EXCEEDED",
            Self::LocalDirTooManyFiles => "LOCAL_DIR_TOO_MANY_FILES",
            Self::LocalDirTotalTooLarge => "LOCAL_DIR_TOTAL_TOO_LARGE",
            Self::LocalIoError => "LOCAL_IO_ERROR",
            Self::RemoteFetchError => "REMOTE_FETCH_ERROR",
            Self::RemoteFetchStatusError => "REMOTE_FETCH_STATUS_ERROR",
            Self::RemoteContentTypeError => "REMOTE_CONTENT_TYPE_ERROR",
            Self::RemoteFileTooLarge => "REMOTE_FILE_TOO_LARGE",
            Self::RemoteJsonParseError => "REMOTE_JSON_PARSE_ERROR",
            Self::RemoteJsonDepthExceeded => "REMOTE_JSON_DEPTH_EXCEEDED",
            Self::RemoteIndexTooManyFiles => "REMOTE_INDEX_TOO_MANY_FILES",
            Self::RemoteIndexInvalidUrl => "REMOTE_INDEX_INVALID_URL",
            Self::RemoteIndexInvalidFormat => "REMOTE_INDEX_INVALID_FORMAT",
            Self::ConcurrencyError => "CONCURRENCY_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loader errors.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Input was empty or could not be classified.
    #[error("invalid input: {message}")]
    InputValidation { message: String },

    /// Sanitizer circuit breaker tripped.
    #[error("JSON nesting depth exceeds sanitizer limit {limit}")]
    DepthSanitationExceeded { limit: usize },

    /// Raw string passed to the standalone parser was not valid JSON.
    #[error("JSON parse error: {message}")]
    JsonParse { message: String },

    #[error("path not found: {path}")]
    LocalPathNotFound { path: String },

    /// Path is neither a regular file nor a directory.
    #[error("unsupported path type: {path}")]
    LocalPathType { path: String },

    #[error("not a .json file: {path}")]
    LocalFileExtension { path: String },

    #[error("file {path} is {size} bytes, exceeds limit {limit}")]
    LocalFileTooLarge { path: String, size: u64, limit: u64 },

    #[error("failed to parse {path}: {message}")]
    LocalJsonParse { path: String, message: String },

    #[error("JSON depth {depth} in {path} exceeds limit {limit}")]
    LocalJsonDepthExceeded {
        path: String,
        depth: usize,
        limit: usize,
    },

    #[error("directory {path} holds {count} JSON files, exceeds limit {limit}")]
    LocalDirTooManyFiles {
        path: String,
        count: usize,
        limit: usize,
    },

    #[error("directory {path} exceeds total size limit {limit} bytes")]
    LocalDirTotalTooLarge { path: String, limit: u64 },

    #[error("I/O error on {path}: {message}")]
    LocalIo { path: String, message: String },

    /// Transport failure or timeout.
    #[error("failed to fetch {url}: {message}")]
    RemoteFetch { url: String, message: String },

    #[error("fetching {url} returned HTTP {status}")]
    RemoteFetchStatus { url: String, status: u16 },

    #[error("unexpected content-type for {url}: {content_type}")]
    RemoteContentType { url: String, content_type: String },

    #[error("response from {url} exceeds limit {limit} bytes")]
    RemoteFileTooLarge { url: String, limit: u64 },

    #[error("failed to parse response from {url}: {message}")]
    RemoteJsonParse { url: String, message: String },

    #[error("JSON depth {depth} in {url} exceeds limit {limit}")]
    RemoteJsonDepthExceeded {
        url: String,
        depth: usize,
        limit: usize,
    },

    #[error("index {url} lists {count} files, exceeds limit {limit}")]
    RemoteIndexTooManyFiles {
        url: String,
        count: usize,
        limit: usize,
    },

    #[error("index {url} contains invalid URL: {entry}")]
    RemoteIndexInvalidUrl { url: String, entry: String },

    #[error("index {url} has an unsupported shape: {message}")]
    RemoteIndexInvalidFormat { url: String, message: String },

    #[error("concurrency error: {message}")]
    Concurrency { message: String },
}

impl LoaderError {
    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InputValidation { .. } => ErrorCode::InputValidationError,
            Self::DepthSanitationExceeded { .. } => ErrorCode::DepthSanitationExceeded,
            Self::JsonParse { .. } => ErrorCode::JsonParseError,

            Self::LocalPathNotFound { .. } => ErrorCode::LocalPathNotFound,
            Self::LocalPathType { .. } => ErrorCode::LocalPathTypeError,
            Self::LocalFileExtension { .. } => ErrorCode::LocalFileExtensionError,
            Self::LocalFileTooLarge { .. } => ErrorCode::LocalFileTooLarge,
            Self::LocalJsonParse { .. } => ErrorCode::LocalJsonParseError,
            Self::LocalJsonDepthExceeded { .. } => ErrorCode::LocalJsonDepthExceeded,
            Self::LocalDirTooManyFiles { .. } => ErrorCode::LocalDirTooManyFiles,
            Self::LocalDirTotalTooLarge { .. } => ErrorCode::LocalDirTotalTooLarge,
            Self::LocalIo { .. } => ErrorCode::LocalIoError,

            Self::RemoteFetch { .. } => ErrorCode::RemoteFetchError,
            Self::RemoteFetchStatus { .. } => ErrorCode::RemoteFetchStatusError,
            Self::RemoteContentType { .. } => ErrorCode::RemoteContentTypeError,
            Self::RemoteFileTooLarge { .. } => ErrorCode::RemoteFileTooLarge,
            Self::RemoteJsonParse { .. } => ErrorCode::RemoteJsonParseError,
            Self::RemoteJsonDepthExceeded { .. } => ErrorCode::RemoteJsonDepthExceeded,
            Self::RemoteIndexTooManyFiles { .. } => ErrorCode::RemoteIndexTooManyFiles,
            Self::RemoteIndexInvalidUrl { .. } => ErrorCode::RemoteIndexInvalidUrl,
            Self::RemoteIndexInvalidFormat { .. } => ErrorCode::RemoteIndexInvalidFormat,

            Self::Concurrency { .. } => ErrorCode::ConcurrencyError,
        }
    }

    /// Whether the failure came from a size or count policy rather than bad data.
    pub fn is_limit_violation(&self) -> bool {
        matches!(
            self,
            Self::DepthSanitationExceeded { .. }
                | Self::LocalFileTooLarge { .. }
                | Self::LocalJsonDepthExceeded { .. }
                | Self::LocalDirTooManyFiles { .. }
                | Self::LocalDirTotalTooLarge { .. }
                | Self::RemoteFileTooLarge { .. }
                | Self::RemoteJsonDepthExceeded { .. }
                | Self::RemoteIndexTooManyFiles { .. }
        )
    }

    pub(crate) fn local_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

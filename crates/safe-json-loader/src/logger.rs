//! Logger capability passed to the loader through its configuration.
//!
//! The loader never touches global logging state. Whatever it has to say goes
//! to the [`Logger`] in [`LoaderConfig`](crate::LoaderConfig); the default is
//! [`NoopLogger`]. Use [`TracingLogger`] to route events into `tracing`.

use std::sync::Arc;

use serde_json::Value as JsonValue;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sink for loader events.
///
/// Every method defaults to doing nothing, so an implementation only
/// overrides the severities it cares about.
pub trait Logger: Send + Sync {
    fn debug(&self, _message: &str, _meta: &JsonValue) {}

    fn info(&self, _message: &str, _meta: &JsonValue) {}

    fn warn(&self, _message: &str, _meta: &JsonValue) {}

    fn error(&self, _message: &str, _meta: &JsonValue) {}

    /// Dispatch to the method for `level`.
    fn log(&self, level: LogLevel, message: &str, meta: &JsonValue) {
        match level {
            LogLevel::Debug => self.debug(message, meta),
            LogLevel::Info => self.info(message, meta),
            LogLevel::Warn => self.warn(message, meta),
            LogLevel::Error => self.error(message, meta),
        }
    }
}

/// Shared handle to a logger.
pub type SharedLogger = Arc<dyn Logger>;

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {}

/// Forwards events to `tracing` with the metadata as a `meta` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str, meta: &JsonValue) {
        tracing::debug!(meta = %meta, "{}", message);
    }

    fn info(&self, message: &str, meta: &JsonValue) {
        tracing::info!(meta = %meta, "{}", message);
    }

    fn warn(&self, message: &str, meta: &JsonValue) {
        tracing::warn!(meta = %meta, "{}", message);
    }

    fn error(&self, message: &str, meta: &JsonValue) {
        tracing::error!(meta = %meta, "{}", message);
    }
}

//! Logging sink seam.
//!
//! The client reports every attempt, scheduled retry, exhaustion, and final
//! classification through an injected [`LogSink`]. The default sink forwards
//! to [`tracing`]; production builds can swap in a remote telemetry sink
//! without touching the client.
//!
//! Policy: logging never affects request control flow. Sinks are infallible
//! by contract — a sink that talks to a remote collector must absorb its own
//! failures rather than surface them.

use serde_json::Value;

/// Severity of a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured context attached to a log entry.
pub type LogContext = serde_json::Map<String, Value>;

/// Destination for the client's structured log entries.
pub trait LogSink: Send + Sync {
    /// Record one entry. Must not panic and must not block the caller on
    /// slow I/O.
    fn log(&self, level: LogLevel, message: &str, context: &LogContext);
}

/// Default sink: forwards entries to [`tracing`] events with the context
/// map rendered as a single JSON field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, context: &LogContext) {
        let context = Value::Object(context.clone());
        match level {
            LogLevel::Debug => tracing::debug!(target: "partneriq_api", %context, "{message}"),
            LogLevel::Info => tracing::info!(target: "partneriq_api", %context, "{message}"),
            LogLevel::Warn => tracing::warn!(target: "partneriq_api", %context, "{message}"),
            LogLevel::Error => tracing::error!(target: "partneriq_api", %context, "{message}"),
        }
    }
}

/// A sink that discards everything. Useful in tests asserting on behavior
/// unrelated to logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: LogLevel, _message: &str, _context: &LogContext) {}
}

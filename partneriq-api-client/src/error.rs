//! The classified error surfaced by the request client.
//!
//! This module provides [`ApiError`], the single error type callers see.
//! Raw transport, TLS, and parse failures never escape the client; they are
//! reduced to an `ApiError` carrying a user-facing message, a
//! classification kind, and enough context for callers to offer a retry
//! affordance.

use std::sync::Arc;

use http::StatusCode;
use serde_json::Value;

use partneriq_api_core::ErrorKind;

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A classified request failure.
///
/// Constructed only after the retry loop has exhausted its attempts or hit
/// a non-retryable condition. The `message` is safe to show to end users;
/// the original cause is retained for debugging but is not part of the
/// display output.
///
/// # Example
///
/// ```
/// use partneriq_api_client::ApiError;
/// use partneriq_api_core::ErrorKind;
///
/// let err = ApiError::new(ErrorKind::Auth, "Token expired")
///     .with_status(http::StatusCode::UNAUTHORIZED);
/// assert_eq!(err.kind(), ErrorKind::Auth);
/// assert_eq!(err.to_string(), "Token expired");
/// assert!(!err.is_retryable());
/// ```
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    http_status: Option<StatusCode>,
    retryable: bool,
    errors: Option<Value>,
    cause: Option<Cause>,
}

impl ApiError {
    /// Create a new classified error with a kind and user-facing message.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            retryable: false,
            errors: None,
            cause: None,
        }
    }

    /// Attach the HTTP status the server responded with.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Mark whether the failed condition was transient.
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Attach the server's field-level error detail map.
    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attach the original cause for debugging.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// The classification kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status, when a response was received.
    pub fn http_status(&self) -> Option<StatusCode> {
        self.http_status
    }

    /// Whether the condition was transient. Callers use this to offer a
    /// "try again" affordance.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The server's field-level error details, when provided.
    pub fn errors(&self) -> Option<&Value> {
        self.errors.as_ref()
    }

    /// The original cause, when one was captured.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partneriq_api_core::messages;
    use serde_json::json;

    #[test]
    fn test_new_defaults() {
        let err = ApiError::new(ErrorKind::Network, messages::NETWORK);
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.message(), messages::NETWORK);
        assert!(err.http_status().is_none());
        assert!(!err.is_retryable());
        assert!(err.errors().is_none());
        assert!(err.cause().is_none());
    }

    #[test]
    fn test_builder_accessors() {
        let err = ApiError::new(ErrorKind::Validation, "bad email")
            .with_status(StatusCode::BAD_REQUEST)
            .with_errors(json!({"email": ["is invalid"]}))
            .retryable(false);
        assert_eq!(err.http_status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.errors().unwrap()["email"][0], json!("is invalid"));
    }

    #[test]
    fn test_display_is_message_only() {
        let err = ApiError::new(ErrorKind::Server, messages::SERVER)
            .with_status(StatusCode::BAD_GATEWAY)
            .with_cause(std::io::Error::other("upstream connect error"));
        assert_eq!(err.to_string(), messages::SERVER);
    }

    #[test]
    fn test_clone_preserves_fields() {
        let err = ApiError::new(ErrorKind::Timeout, messages::TIMEOUT)
            .with_status(StatusCode::REQUEST_TIMEOUT)
            .retryable(true);
        let copy = err.clone();
        assert_eq!(copy.kind(), err.kind());
        assert_eq!(copy.message(), err.message());
        assert_eq!(copy.http_status(), err.http_status());
        assert_eq!(copy.is_retryable(), err.is_retryable());
    }
}

//! Per-call options.
//!
//! [`CallOptions`] configures a single request with extra headers or a
//! timeout override, leaving the client defaults untouched.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Options for configuring an individual request.
///
/// # Example
///
/// ```
/// use partneriq_api_client::CallOptions;
/// use std::time::Duration;
///
/// let options = CallOptions::new()
///     .timeout(Duration::from_secs(5))
///     .header("x-request-id", "abc-123");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Per-attempt timeout for this call. If set, overrides the client's
    /// default timeout.
    pub(crate) timeout: Option<Duration>,
    /// Custom headers for this call.
    pub(crate) headers: HeaderMap,
}

impl CallOptions {
    /// Create new default call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the configured timeout, if any.
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Add a custom header for this call.
    ///
    /// Headers the client manages itself (`content-type`, `accept`,
    /// `authorization`, `content-length`) are ignored at request time.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// Try to add a custom header for this call.
    ///
    /// Returns `None` if the header name or value is invalid.
    pub fn try_header<K, V>(mut self, name: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = name.try_into().ok()?;
        let value = value.try_into().ok()?;
        self.headers.insert(name, value);
        Some(self)
    }

    /// Get the configured headers.
    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CallOptions::new();
        assert!(options.get_timeout().is_none());
        assert!(options.get_headers().is_empty());
    }

    #[test]
    fn test_timeout() {
        let options = CallOptions::new().timeout(Duration::from_secs(5));
        assert_eq!(options.get_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_header() {
        let options = CallOptions::new().header("x-request-id", "abc-123");
        assert_eq!(
            options.get_headers().get("x-request-id").unwrap(),
            "abc-123"
        );
    }

    #[test]
    fn test_try_header_invalid() {
        assert!(CallOptions::new().try_header("bad header\n", "v").is_none());
    }

    #[test]
    #[should_panic(expected = "invalid header name")]
    fn test_header_invalid_panics() {
        let _ = CallOptions::new().header("bad header\n", "v");
    }
}

//! Client builder.
//!
//! Provides a fluent API for configuring and building an [`ApiClient`].

use std::sync::Arc;
use std::time::Duration;

use crate::client::ApiClient;
use crate::config::RetryPolicy;
use crate::credentials::{NoCredentials, TokenProvider};
use crate::logging::{LogSink, TracingSink};
use crate::transport::HttpTransport;

/// Default base path prepended to every request path.
pub const DEFAULT_BASE_PATH: &str = "/api/v1";

/// Environment variable consulted by [`ClientBuilder::from_env`].
pub const BASE_URL_ENV: &str = "PARTNERIQ_API_URL";

/// Builder for creating an [`ApiClient`].
///
/// # Example
///
/// ```ignore
/// use partneriq_api_client::{ApiClient, RetryPolicy, StaticToken};
/// use std::time::Duration;
///
/// let client = ApiClient::builder("https://partneriq.example.com")
///     .retry_policy(RetryPolicy::new().max_retries(5))
///     .credentials(StaticToken::new("t-123"))
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct ClientBuilder {
    /// Base URL for the API (e.g., "https://partneriq.example.com").
    base_url: String,
    /// Path prefix appended to the base URL (default "/api/v1").
    base_path: String,
    /// Retry behavior.
    retry_policy: RetryPolicy,
    /// Bearer token source, read on every attempt.
    credentials: Arc<dyn TokenProvider>,
    /// Destination for structured log entries.
    log_sink: Arc<dyn LogSink>,
    /// Default per-attempt timeout.
    timeout: Option<Duration>,
    /// Optional pre-configured transport.
    transport: Option<HttpTransport>,
    /// Accept invalid TLS certificates when the builder creates the
    /// transport (dangerous!).
    danger_accept_invalid_certs: bool,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("retry_policy", &self.retry_policy)
            .field("timeout", &self.timeout)
            .field("transport", &self.transport.is_some())
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    /// Create a new ClientBuilder with the given base URL.
    ///
    /// The base URL should include the scheme and host, e.g.,
    /// "https://partneriq.example.com". Do not include the API path prefix;
    /// that is configured separately via [`base_path`](Self::base_path).
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            retry_policy: RetryPolicy::default(),
            credentials: Arc::new(NoCredentials),
            log_sink: Arc::new(TracingSink),
            timeout: None,
            transport: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Create a builder with the base URL taken from the `PARTNERIQ_API_URL`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or empty.
    pub fn from_env() -> Result<Self, ClientBuildError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(url.trim())),
            _ => Err(ClientBuildError::MissingBaseUrl),
        }
    }

    /// Set the path prefix appended to the base URL.
    ///
    /// Default is `/api/v1`. Pass an empty string to address endpoints at
    /// the server root.
    pub fn base_path<S: Into<String>>(mut self, base_path: S) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the credential provider.
    ///
    /// The provider is read on every attempt, so an external refresh layer
    /// that swaps the token between attempts is picked up transparently.
    pub fn credentials<P: TokenProvider + 'static>(mut self, provider: P) -> Self {
        self.credentials = Arc::new(provider);
        self
    }

    /// Set the log sink.
    ///
    /// Defaults to [`TracingSink`]. Swap in a remote telemetry sink for
    /// production builds; sinks never affect request control flow.
    pub fn log_sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.log_sink = Arc::new(sink);
        self
    }

    /// Set the default per-attempt timeout.
    ///
    /// Applies to each transport attempt individually; backoff delays are
    /// not counted against it. Individual calls can override this via
    /// [`CallOptions::timeout`](crate::CallOptions::timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a pre-configured transport.
    ///
    /// This allows custom TLS and connection-pool settings; see
    /// [`HttpTransportBuilder`](crate::transport::HttpTransportBuilder).
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// Only applies when the builder creates the transport; if a transport
    /// is provided via [`transport`](Self::transport), configure it there.
    ///
    /// # Warning
    ///
    /// Development/testing only.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    /// Build the ApiClient.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry policy is invalid.
    pub fn build(self) -> Result<ApiClient, ClientBuildError> {
        self.retry_policy
            .validate()
            .map_err(ClientBuildError::RetryPolicy)?;

        let transport = match self.transport {
            Some(t) => t,
            None => {
                let mut builder = HttpTransport::builder();
                if self.danger_accept_invalid_certs {
                    builder = builder.danger_accept_invalid_certs();
                }
                builder.build()
            }
        };

        // Normalize: base URL without trailing slash, base path with a
        // leading slash and no trailing slash (or empty).
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let base_path = normalize_base_path(&self.base_path);

        Ok(ApiClient::new(
            transport,
            base_url,
            base_path,
            self.retry_policy,
            self.credentials,
            self.log_sink,
            self.timeout,
        ))
    }
}

fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Error type for client building failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The retry policy failed validation.
    #[error("invalid retry policy: {0}")]
    RetryPolicy(&'static str),

    /// No base URL was provided via the environment.
    #[error("PARTNERIQ_API_URL is unset or empty")]
    MissingBaseUrl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("https://partneriq.example.com");
        assert_eq!(builder.base_path, DEFAULT_BASE_PATH);
        assert!(builder.timeout.is_none());
        assert!(builder.transport.is_none());
    }

    #[test]
    fn test_builder_build() {
        let result = ClientBuilder::new("https://partneriq.example.com").build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_builder_normalizes_url() {
        let client = ClientBuilder::new("https://partneriq.example.com/")
            .build()
            .unwrap();
        assert!(!client.base_url().ends_with('/'));
    }

    #[test]
    fn test_base_path_normalization() {
        assert_eq!(normalize_base_path("/api/v1"), "/api/v1");
        assert_eq!(normalize_base_path("api/v1"), "/api/v1");
        assert_eq!(normalize_base_path("api/v1/"), "/api/v1");
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/"), "");
    }

    #[test]
    fn test_builder_custom_base_path() {
        let client = ClientBuilder::new("https://partneriq.example.com")
            .base_path("internal/v2/")
            .build()
            .unwrap();
        assert_eq!(client.base_path(), "/internal/v2");
    }

    #[test]
    fn test_builder_rejects_invalid_retry_policy() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_secs(60))
            .max_delay(Duration::from_secs(1));
        let result = ClientBuilder::new("https://partneriq.example.com")
            .retry_policy(policy)
            .build();
        assert!(matches!(result, Err(ClientBuildError::RetryPolicy(_))));
    }

    #[test]
    fn test_from_env() {
        unsafe { std::env::set_var(BASE_URL_ENV, "https://env.partneriq.example.com/") };
        let builder = ClientBuilder::from_env().unwrap();
        assert_eq!(builder.base_url, "https://env.partneriq.example.com/");
        unsafe { std::env::remove_var(BASE_URL_ENV) };
        assert!(matches!(
            ClientBuilder::from_env(),
            Err(ClientBuildError::MissingBaseUrl)
        ));
    }

    #[test]
    fn test_builder_timeout() {
        let builder =
            ClientBuilder::new("https://partneriq.example.com").timeout(Duration::from_secs(30));
        assert_eq!(builder.timeout, Some(Duration::from_secs(30)));
    }
}

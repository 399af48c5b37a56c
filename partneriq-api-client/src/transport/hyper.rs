//! Pooled hyper-based HTTP transport.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;
use tower_service::Service;

use super::body::RequestBody;
use super::connector::{build_https_connector, danger_accept_invalid_certs_config};

/// Type alias for the hyper client with HTTPS connector.
type HyperClient = Client<HttpsConnector<HttpConnector>, RequestBody>;

/// Error raised when the transport fails to produce a response.
///
/// This never reaches the public API: the request pipeline reduces it to a
/// classified error before returning.
#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(#[from] hyper_util::client::legacy::Error);

/// Pooled HTTP transport.
///
/// Provides HTTP/1.1 and HTTP/2 with TLS, connection pooling, and automatic
/// protocol negotiation via ALPN. Cloning is cheap and shares the pool.
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransport::builder()
///     .pool_idle_timeout(Duration::from_secs(60))
///     .build();
///
/// let client = ApiClient::builder("https://partneriq.example.com")
///     .transport(transport)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HttpTransport {
    client: HyperClient,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a new transport builder.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Send an HTTP request and receive a response.
    pub async fn request(
        &self,
        request: http::Request<RequestBody>,
    ) -> Result<http::Response<Incoming>, TransportError> {
        Ok(self.client.request(request).await?)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`HttpTransport`].
///
/// # Example
///
/// ```ignore
/// let transport = HttpTransportBuilder::new()
///     .pool_idle_timeout(Duration::from_secs(90))
///     .pool_max_idle_per_host(16)
///     .build();
/// ```
pub struct HttpTransportBuilder {
    /// Custom TLS configuration.
    tls_config: Option<ClientConfig>,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
    /// Whether to accept invalid certificates (dangerous!).
    danger_accept_invalid_certs: bool,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            danger_accept_invalid_certs: false,
        }
    }

    /// Set a custom TLS configuration.
    ///
    /// Use this for custom root certificates or client certificates (mTLS).
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Connections idle for longer than this are closed and removed from
    /// the pool. Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable the connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// Development/testing only; this makes the connection vulnerable to
    /// man-in-the-middle attacks.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    /// Build the transport.
    ///
    /// # Panics
    ///
    /// Panics if no TLS configuration can be assembled (no custom config,
    /// no TLS features, no global crypto provider). See
    /// [`build_https_connector`].
    pub fn build(self) -> HttpTransport {
        let tls_config = if self.danger_accept_invalid_certs {
            Some(danger_accept_invalid_certs_config())
        } else {
            self.tls_config
        };

        let https_connector = build_https_connector(tls_config);

        let mut builder = Client::builder(TokioExecutor::new());

        // Pool timer is required for pool_idle_timeout to take effect
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        HttpTransport {
            client: builder.build(https_connector),
        }
    }
}

impl std::fmt::Debug for HttpTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .finish()
    }
}

// Tower service impl so the transport can slot into middleware stacks.
impl Service<http::Request<RequestBody>> for HttpTransport {
    type Response = http::Response<Incoming>;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The pooled client is always ready
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<RequestBody>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move { Ok(client.request(req).await?) })
    }
}

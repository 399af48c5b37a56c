//! Resilient REST client for the Partner IQ API.
//!
//! This crate wraps outbound HTTP calls with automatic retry, exponential
//! backoff with jitter, response envelope validation, and structured error
//! classification. Callers receive either the unwrapped typed payload or a
//! single classified error type ([`ApiError`]) — raw transport, TLS, and
//! parse failures never escape.
//!
//! ## Features
//!
//! - `get`/`post`/`put`/`patch`/`delete` against JSON envelope endpoints
//! - Transparent retry of transient failures (configurable status set,
//!   default {500, 502, 503, 504, 408, 429}, plus network failures and
//!   client-side timeouts)
//! - Power-of-two backoff with ±25% jitter, capped at a configurable max
//! - Content-type validation: an HTML error page served with a 2xx status
//!   is surfaced as a classified parse error, with the page's message
//!   extracted from its markup
//! - Injected credential provider, read on every attempt
//! - Injected structured-logging sink with sensitive-field redaction
//!
//! ## Example
//!
//! ```ignore
//! use partneriq_api_client::{ApiClient, RetryPolicy, StaticToken};
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Deserialize)]
//! struct Payout { id: u64, amount_cents: i64 }
//!
//! let client = ApiClient::builder("https://partneriq.example.com")
//!     .retry_policy(RetryPolicy::new().max_retries(3))
//!     .credentials(StaticToken::new(session_token))
//!     .timeout(Duration::from_secs(15))
//!     .build()?;
//!
//! let payouts: Vec<Payout> = client.get("/payouts?status=pending").await?;
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ApiError`] carrying a user-facing message, an
//! [`ErrorKind`], the HTTP status when one was received, and a `retryable`
//! flag callers can key a "try again" affordance off:
//!
//! ```ignore
//! match client.get::<Dashboard>("/dashboard").await {
//!     Ok(dashboard) => render(dashboard),
//!     Err(err) if err.is_retryable() => show_retry_banner(err.message()),
//!     Err(err) => show_error(err.message()),
//! }
//! ```
//!
//! ## Retry Policy
//!
//! ```ignore
//! use partneriq_api_client::RetryPolicy;
//! use std::time::Duration;
//!
//! // Default: 3 retries, 1s base delay, 30s max delay, ±25% jitter
//! let default = RetryPolicy::default();
//!
//! // Aggressive: 5 retries, 50ms base delay — latency-sensitive calls
//! let aggressive = RetryPolicy::aggressive();
//!
//! // Patient: 10 retries, 2s base delay — background work
//! let patient = RetryPolicy::patient();
//!
//! // Disable retries entirely
//! let none = RetryPolicy::no_retry();
//! ```
//!
//! ## Concurrency and Cancellation
//!
//! The client is `Clone` and holds no mutable state across calls; any
//! number of requests may be in flight concurrently. Backoff sleeps are
//! non-blocking tokio timers. Dropping the future returned by a request
//! method cancels the in-flight transport call and any pending backoff
//! sleep.
//!
//! ## Logging
//!
//! Every attempt, scheduled retry, exhaustion, and final classification is
//! reported through the configured [`LogSink`] (default: [`tracing`] via
//! [`TracingSink`]) with structured context: method, endpoint, status,
//! error kind, attempt count, and the request body with sensitive fields
//! (`password`, `token`, `secret`, ...) redacted. Logging never affects
//! request control flow.
//!
//! ## TLS Configuration
//!
//! TLS uses rustls, with the stack selected by feature flags:
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `tls` (default) | `tls-ring` + `tls-native-roots` |
//! | `tls-ring` / `tls-aws-lc` | Crypto provider |
//! | `tls-native-roots` / `tls-webpki-roots` | Root certificate source |
//!
//! For custom roots or mTLS, pass a `rustls::ClientConfig` through
//! [`transport::HttpTransportBuilder::tls_config`].

mod builder;
mod client;
pub mod config;
mod credentials;
mod error;
mod logging;
pub mod response;
pub mod transport;

pub use builder::{BASE_URL_ENV, ClientBuildError, ClientBuilder, DEFAULT_BASE_PATH};
pub use client::ApiClient;
pub use error::ApiError;

// Re-export from config module
pub use config::{CallOptions, ExponentialBackoff, RetryPolicy, defaults};

// Credential and logging seams
pub use credentials::{NoCredentials, StaticToken, TokenProvider};
pub use logging::{LogContext, LogLevel, LogSink, NullSink, TracingSink};

// Re-export transport types at the top level for convenience
pub use transport::{HttpTransport, HttpTransportBuilder, RequestBody, TlsClientConfig};

// Re-export core types that users need
pub use partneriq_api_core::{Envelope, ErrorBody, ErrorKind, messages, sanitize};

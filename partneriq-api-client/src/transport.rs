//! HTTP transport layer.
//!
//! This module provides [`HttpTransport`], the pooled hyper-based client
//! the request pipeline sends through. It supports:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls (feature-gated)
//! - Connection pooling
//!
//! # Feature Flags
//!
//! TLS support requires enabling the appropriate features:
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates
//!
//! # Example
//!
//! ```ignore
//! use partneriq_api_client::transport::{HttpTransport, HttpTransportBuilder};
//! use std::time::Duration;
//!
//! // Default settings (uses default TLS if features enabled)
//! let transport = HttpTransport::new();
//!
//! // Or use the builder for customization
//! let transport = HttpTransportBuilder::new()
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build();
//! ```

mod body;
mod connector;
mod hyper;

pub use body::RequestBody;
pub use connector::{
    build_http_connector, build_https_connector, danger_accept_invalid_certs_config,
    has_tls_support,
};

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub use connector::default_tls_config;

pub use hyper::{HttpTransport, HttpTransportBuilder, TransportError};

// Re-export the rustls config type users need for custom TLS setups
pub use rustls::ClientConfig as TlsClientConfig;

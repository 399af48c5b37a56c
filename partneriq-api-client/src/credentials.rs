//! Credential provider seam.
//!
//! The client reads the bearer token through an injected [`TokenProvider`]
//! on every attempt, so an external refresh layer that swaps the credential
//! between attempts (for example after a 401-triggered refresh) is picked
//! up without the client knowing about it. Token refresh itself is out of
//! scope for this crate.

/// Capability interface for supplying the current bearer token.
pub trait TokenProvider: Send + Sync {
    /// The token to attach to the next attempt, or `None` for anonymous
    /// requests. Called once per attempt; implementations should be cheap.
    fn token(&self) -> Option<String>;
}

/// A fixed token, set once at construction.
#[derive(Clone, Debug)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No credentials: requests are sent without an `authorization` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentials;

impl TokenProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_static_token() {
        let provider = StaticToken::new("t-123");
        assert_eq!(provider.token().as_deref(), Some("t-123"));
    }

    #[test]
    fn test_no_credentials() {
        assert!(NoCredentials.token().is_none());
    }

    #[test]
    fn test_provider_read_per_call() {
        struct Rotating(AtomicUsize);
        impl TokenProvider for Rotating {
            fn token(&self) -> Option<String> {
                Some(format!("t-{}", self.0.fetch_add(1, Ordering::SeqCst)))
            }
        }
        let provider = Rotating(AtomicUsize::new(0));
        assert_eq!(provider.token().as_deref(), Some("t-0"));
        assert_eq!(provider.token().as_deref(), Some("t-1"));
    }
}

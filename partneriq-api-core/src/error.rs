//! Error classification taxonomy.
//!
//! This module provides [`ErrorKind`], the small set of categories every
//! request failure is reduced to before it reaches a caller, and the
//! status-code mapping used during classification.

use std::str::FromStr;

use serde::Serialize;

/// Classification categories for request failures.
///
/// Every failure the client surfaces carries exactly one of these kinds,
/// regardless of whether it originated in the transport, the HTTP layer,
/// or response parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No HTTP response was received (connection refused, DNS failure,
    /// connection reset).
    Network,
    /// The server reported an internal failure (500/502/503/504).
    Server,
    /// The response could not be interpreted as the expected JSON envelope.
    Parse,
    /// The request timed out, either client-side or via HTTP 408.
    Timeout,
    /// Authentication failed or the session expired (HTTP 401).
    Auth,
    /// A request-level failure attributable to the caller (404 and other
    /// client-class statuses).
    Client,
    /// The server rejected the request payload (HTTP 400).
    Validation,
}

impl ErrorKind {
    /// Get the string representation of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Parse => "parse",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Auth => "auth",
            ErrorKind::Client => "client",
            ErrorKind::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`ErrorKind`] from a string fails.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown error kind")]
pub struct ParseKindError(());

impl FromStr for ErrorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" => Ok(ErrorKind::Network),
            "server" => Ok(ErrorKind::Server),
            "parse" => Ok(ErrorKind::Parse),
            "timeout" => Ok(ErrorKind::Timeout),
            "auth" => Ok(ErrorKind::Auth),
            "client" => Ok(ErrorKind::Client),
            "validation" => Ok(ErrorKind::Validation),
            _ => Err(ParseKindError(())),
        }
    }
}

/// Map an HTTP status code to its classification kind.
///
/// Statuses without a dedicated row in the classification table fall back
/// to [`ErrorKind::Client`].
pub fn kind_for_status(status: http::StatusCode) -> ErrorKind {
    match status.as_u16() {
        400 => ErrorKind::Validation,
        401 => ErrorKind::Auth,
        404 => ErrorKind::Client,
        408 => ErrorKind::Timeout,
        500 | 502 | 503 | 504 => ErrorKind::Server,
        _ => ErrorKind::Client,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_kind_as_str_round_trip() {
        for kind in [
            ErrorKind::Network,
            ErrorKind::Server,
            ErrorKind::Parse,
            ErrorKind::Timeout,
            ErrorKind::Auth,
            ErrorKind::Client,
            ErrorKind::Validation,
        ] {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_from_str_unknown() {
        assert!("bogus".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn test_kind_for_status() {
        assert_eq!(kind_for_status(StatusCode::BAD_REQUEST), ErrorKind::Validation);
        assert_eq!(kind_for_status(StatusCode::UNAUTHORIZED), ErrorKind::Auth);
        assert_eq!(kind_for_status(StatusCode::NOT_FOUND), ErrorKind::Client);
        assert_eq!(kind_for_status(StatusCode::REQUEST_TIMEOUT), ErrorKind::Timeout);
        assert_eq!(kind_for_status(StatusCode::INTERNAL_SERVER_ERROR), ErrorKind::Server);
        assert_eq!(kind_for_status(StatusCode::BAD_GATEWAY), ErrorKind::Server);
        assert_eq!(kind_for_status(StatusCode::SERVICE_UNAVAILABLE), ErrorKind::Server);
        assert_eq!(kind_for_status(StatusCode::GATEWAY_TIMEOUT), ErrorKind::Server);
        // Statuses without a dedicated row fall back to Client
        assert_eq!(kind_for_status(StatusCode::FORBIDDEN), ErrorKind::Client);
        assert_eq!(kind_for_status(StatusCode::UNPROCESSABLE_ENTITY), ErrorKind::Client);
        assert_eq!(kind_for_status(StatusCode::TOO_MANY_REQUESTS), ErrorKind::Client);
        assert_eq!(kind_for_status(StatusCode::NOT_IMPLEMENTED), ErrorKind::Client);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::Validation).unwrap();
        assert_eq!(json, "\"validation\"");
    }
}

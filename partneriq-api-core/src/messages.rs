//! Canonical user-facing message strings.
//!
//! These are the messages shown to end users when the server does not
//! provide one (or, for server-class failures, regardless of what the
//! server body contains). They are consts so the client and its tests
//! compare against a single source of truth.

/// No HTTP response was received.
pub const NETWORK: &str =
    "Unable to reach the server. Please check your connection and try again.";

/// The response was not the expected JSON envelope.
pub const PARSE: &str = "Received an unexpected response from the server.";

/// The requested resource does not exist.
pub const NOT_FOUND: &str = "The requested resource was not found.";

/// The server rejected the request payload.
pub const VALIDATION: &str = "Some of the submitted information is invalid.";

/// Authentication is missing or no longer valid.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// The request timed out.
pub const TIMEOUT: &str = "The request timed out. Please try again.";

/// The server reported an internal failure. Shown for every 5xx in the
/// server class, never the server body, to avoid leaking internals.
pub const SERVER: &str = "Something went wrong on our end. Please try again later.";

/// Fallback for statuses without a dedicated message.
pub const FALLBACK: &str = "The request could not be completed. Please try again.";

//! Core API types for Partner IQ clients.
//!
//! This crate provides the shared vocabulary used by the request client
//! (`partneriq-api-client`) and any tooling that talks to the Partner IQ
//! REST API.
//!
//! ## Modules
//!
//! - [`error`]: Error classification taxonomy and status-code mapping
//! - [`envelope`]: The server's standard JSON response envelope
//! - [`messages`]: Canonical user-facing message strings
//! - [`sanitize`]: Log hygiene helpers (redaction, truncation)

mod envelope;
mod error;
pub mod messages;
pub mod sanitize;

pub use envelope::*;
pub use error::*;

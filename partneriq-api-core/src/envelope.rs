//! The server's standard JSON response envelope.
//!
//! Every Partner IQ endpoint wraps its payload in a common envelope:
//!
//! ```json
//! {"success": true, "data": {...}, "message": "optional", "errors": null}
//! ```
//!
//! Failure responses carry a reduced body with `message` (some endpoints
//! use `error` instead) and an optional field-level `errors` map.

use serde::Deserialize;
use serde_json::Value;

/// Successful response wrapper.
///
/// `data` is kept as raw JSON so the client can deserialize it into the
/// caller's target type after the envelope itself has been validated. A
/// missing `data` field is treated as JSON `null`, which lets unit-like
/// targets (`()`, `Option<T>`) deserialize cleanly.
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl Envelope {
    /// Take the payload, treating a missing `data` field as JSON `null`.
    pub fn into_data(self) -> Value {
        self.data.unwrap_or(Value::Null)
    }
}

/// Failure response body.
///
/// Some endpoints report the human-readable message under `error` rather
/// than `message`; both spellings land in [`ErrorBody::message`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ErrorBody {
    /// Parse a failure body from raw bytes, if it is JSON of the expected
    /// shape. Non-JSON bodies (HTML error pages, plain text) yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }
}

//! Log hygiene helpers.
//!
//! Request bodies are logged alongside failures for debugging; before they
//! reach any sink, credential-bearing fields are replaced with a redaction
//! marker and raw non-JSON bodies are truncated. Redaction applies to the
//! logged copy only, never to the bytes sent on the wire.

use serde_json::Value;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Maximum raw body length kept in log context.
pub const MAX_LOGGED_BODY_BYTES: usize = 512;

/// Key fragments that mark a field as sensitive, matched case-insensitively
/// against each object key.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "token",
    "secret",
    "authorization",
    "api_key",
    "apikey",
    "credential",
];

/// Whether an object key names a sensitive field.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEY_FRAGMENTS.iter().any(|f| key.contains(f))
}

/// Produce a copy of `value` with every sensitive field replaced by
/// [`REDACTED`], recursing through objects and arrays.
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if is_sensitive_key(k) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), sanitize_value(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}

/// Truncate a raw body for logging, marking the cut when one was made.
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_LOGGED_BODY_BYTES {
        return body.to_string();
    }
    // Cut on a char boundary at or below the limit.
    let mut end = MAX_LOGGED_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes total)", &body[..end], body.len())
}

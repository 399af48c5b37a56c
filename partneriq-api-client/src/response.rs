//! Response validation and error classification.
//!
//! This module decides what a received response means: whether a "success"
//! really carries the JSON envelope, and which classified error a failure
//! maps to.

pub(crate) mod classify;

pub use classify::{classify_response, classify_transport, parse_failure};

/// Whether a `content-type` header value denotes JSON.
///
/// Accepts `application/json` and structured-syntax suffixes such as
/// `application/problem+json`, with or without parameters.
pub(crate) fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim();
    mime.eq_ignore_ascii_case("application/json")
        || mime
            .rsplit_once('+')
            .is_some_and(|(_, suffix)| suffix.eq_ignore_ascii_case("json"))
}

/// Whether a `content-type` header value denotes HTML.
pub(crate) fn is_html_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

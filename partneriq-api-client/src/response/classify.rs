//! Error classification.
//!
//! Every failure mode funnels through the functions here, which reduce
//! (status, content type, body, transport cause) to an [`ApiError`] with a
//! user-facing message. Classification is pure: the same inputs always
//! produce the same fields.

use http::StatusCode;

use partneriq_api_core::{ErrorBody, ErrorKind, kind_for_status, messages};

use crate::error::ApiError;

use super::is_html_content_type;

/// Classify a received non-2xx response.
///
/// `retryable` reflects the retry policy's verdict on the status and is
/// recorded on the error so callers can offer a "try again" affordance.
///
/// Server-class statuses (500/502/503/504) always get the fixed generic
/// message; their bodies are never surfaced to users.
pub fn classify_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
    retryable: bool,
) -> ApiError {
    let kind = kind_for_status(status);

    if kind == ErrorKind::Server {
        return ApiError::new(kind, messages::SERVER)
            .with_status(status)
            .retryable(retryable);
    }

    let parsed = ErrorBody::from_bytes(body).unwrap_or_default();
    let server_message = parsed.message.filter(|m| !m.trim().is_empty());

    let message = server_message.unwrap_or_else(|| {
        match status.as_u16() {
            400 => messages::VALIDATION,
            401 => messages::SESSION_EXPIRED,
            404 => messages::NOT_FOUND,
            408 => messages::TIMEOUT,
            _ => {
                // No JSON message; an HTML error page may still name the
                // failure in its markup.
                if is_html_content_type(content_type) {
                    return html_message(body, messages::FALLBACK);
                }
                messages::FALLBACK
            }
        }
        .to_string()
    });

    let mut err = ApiError::new(kind, message)
        .with_status(status)
        .retryable(retryable);
    if let Some(errors) = parsed.errors {
        err = err.with_errors(errors);
    }
    err
}

/// Classify a 2xx response whose body failed JSON validation.
///
/// HTML bodies get their message extracted from the markup; an Express-style
/// `Cannot GET /path` page is special-cased to the generic not-found message
/// so users never see the raw routing text.
pub fn parse_failure(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> ApiError {
    let message = if is_html_content_type(content_type) {
        html_message(body, messages::PARSE)
    } else {
        messages::PARSE.to_string()
    };
    ApiError::new(ErrorKind::Parse, message)
        .with_status(status)
        .retryable(false)
}

/// Classify a failure with no HTTP response at all.
///
/// `timed_out` distinguishes a client-side timeout from other transport
/// failures; both are transient.
pub fn classify_transport(timed_out: bool) -> ApiError {
    if timed_out {
        ApiError::new(ErrorKind::Timeout, messages::TIMEOUT).retryable(true)
    } else {
        ApiError::new(ErrorKind::Network, messages::NETWORK).retryable(true)
    }
}

/// Best user-facing message for an HTML body, with a default when the
/// markup yields nothing usable.
fn html_message(body: &[u8], default: &str) -> String {
    let text = String::from_utf8_lossy(body);
    match extract_html_text(&text) {
        Some(extracted) if is_route_miss(&extracted) => messages::NOT_FOUND.to_string(),
        Some(extracted) => extracted,
        None => default.to_string(),
    }
}

/// Pull the first non-empty text out of `<title>`, `<h1>`, or `<pre>`.
fn extract_html_text(html: &str) -> Option<String> {
    for tag in ["title", "h1", "pre"] {
        if let Some(text) = tag_text(html, tag) {
            return Some(text);
        }
    }
    None
}

/// Extract the trimmed inner text of the first `<tag>…</tag>` pair,
/// tolerating attributes on the opening tag. Case-insensitive.
fn tag_text(html: &str, tag: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = lower.find(&open)?;
    let content_start = start + lower[start..].find('>')? + 1;
    let content_end = content_start + lower[content_start..].find(&close)?;

    let text = html[content_start..content_end].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Whether extracted text is an Express-style route miss
/// (`Cannot GET /api/v1/foo`).
fn is_route_miss(text: &str) -> bool {
    let mut words = text.split_whitespace();
    if words.next() != Some("Cannot") {
        return false;
    }
    matches!(
        words.next(),
        Some("GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS")
    )
}

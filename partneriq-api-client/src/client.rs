//! The resilient request client.
//!
//! This module provides [`ApiClient`], which issues requests against the
//! Partner IQ REST API, transparently retries transient failures with
//! jittered exponential backoff, validates that responses carry the JSON
//! envelope, and reduces every failure mode to a classified [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use partneriq_api_core::{Envelope, ErrorKind, messages, sanitize};

use crate::builder::ClientBuilder;
use crate::config::{CallOptions, RetryPolicy};
use crate::credentials::TokenProvider;
use crate::error::ApiError;
use crate::logging::{LogContext, LogLevel, LogSink};
use crate::response::{classify_response, classify_transport, is_json_content_type, parse_failure};
use crate::transport::{HttpTransport, RequestBody, TransportError};

/// JSON media type sent on request bodies and expected on responses.
fn application_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

/// Check if a header name is managed by the client itself.
///
/// Headers from [`CallOptions`] may not override these.
fn is_reserved_header(name: &http::header::HeaderName) -> bool {
    matches!(
        name.as_str(),
        "content-type" | "accept" | "authorization" | "content-length"
    )
}

/// Resilient Partner IQ API client.
///
/// Cloning is cheap: clones share the pooled transport, the credential
/// provider, and the log sink. The client holds no mutable state across
/// calls, so any number of requests may be in flight concurrently; backoff
/// delays are non-blocking tokio timers and never stall other calls.
///
/// Dropping the future returned by any request method cancels the in-flight
/// transport call and any pending backoff sleep.
///
/// # Example
///
/// ```ignore
/// use partneriq_api_client::ApiClient;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Partner { id: u64, name: String }
///
/// let client = ApiClient::builder("https://partneriq.example.com").build()?;
/// let partner: Partner = client.get("/partners/42").await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    base_url: String,
    base_path: String,
    retry_policy: RetryPolicy,
    credentials: Arc<dyn TokenProvider>,
    log_sink: Arc<dyn LogSink>,
    default_timeout: Option<Duration>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("retry_policy", &self.retry_policy)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

/// One attempt's failure before any response arrived.
enum AttemptFailure {
    TimedOut,
    Connect(TransportError),
    Body(hyper::Error),
}

/// One attempt's collected response.
struct RawResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Bytes,
}

impl ApiClient {
    /// Create a new ClientBuilder with the given base URL.
    pub fn builder<S: Into<String>>(base_url: S) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Called by [`ClientBuilder::build`]. Prefer the builder API.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        transport: HttpTransport,
        base_url: String,
        base_path: String,
        retry_policy: RetryPolicy,
        credentials: Arc<dyn TokenProvider>,
        log_sink: Arc<dyn LogSink>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            base_url,
            base_path,
            retry_policy,
            credentials,
            log_sink,
            default_timeout,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the base path prefix.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Get the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    // Convenience wrappers

    /// Issue a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(Method::GET, path, None, CallOptions::default())
            .await
    }

    /// Issue a GET request with per-call options.
    pub async fn get_with_options<T: DeserializeOwned>(
        &self,
        path: &str,
        options: CallOptions,
    ) -> Result<T, ApiError> {
        self.request::<(), T>(Method::GET, path, None, options).await
    }

    /// Issue a POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), CallOptions::default())
            .await
    }

    /// Issue a POST request with a JSON body and per-call options.
    pub async fn post_with_options<B, T>(
        &self,
        path: &str,
        body: &B,
        options: CallOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body), options).await
    }

    /// Issue a PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), CallOptions::default())
            .await
    }

    /// Issue a PUT request with a JSON body and per-call options.
    pub async fn put_with_options<B, T>(
        &self,
        path: &str,
        body: &B,
        options: CallOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, Some(body), options).await
    }

    /// Issue a PATCH request with a JSON body.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body), CallOptions::default())
            .await
    }

    /// Issue a PATCH request with a JSON body and per-call options.
    pub async fn patch_with_options<B, T>(
        &self,
        path: &str,
        body: &B,
        options: CallOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, Some(body), options).await
    }

    /// Issue a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<(), T>(Method::DELETE, path, None, CallOptions::default())
            .await
    }

    /// Issue a DELETE request with per-call options.
    pub async fn delete_with_options<T: DeserializeOwned>(
        &self,
        path: &str,
        options: CallOptions,
    ) -> Result<T, ApiError> {
        self.request::<(), T>(Method::DELETE, path, None, options)
            .await
    }

    /// Issue a request and return the unwrapped envelope payload.
    ///
    /// `path` is appended to the configured base path. The body, when
    /// present, is serialized once and reused across attempts.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] once the retry budget is exhausted or a
    /// non-retryable condition is hit. The raw transport or parse failure
    /// never escapes; callers only ever see the classified error.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: CallOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(b) => Some(Bytes::from(serde_json::to_vec(b).map_err(|e| {
                ApiError::new(ErrorKind::Parse, messages::PARSE).with_cause(e)
            })?)),
            None => None,
        };
        // Redacted copy for log context only; the wire bytes above are
        // untouched.
        let sanitized = body
            .and_then(|b| serde_json::to_value(b).ok())
            .map(|v| sanitize::sanitize_value(&v));

        let url = self.endpoint_url(path);
        let uri: http::Uri = url.parse().map_err(|e: http::uri::InvalidUri| {
            ApiError::new(ErrorKind::Client, messages::FALLBACK).with_cause(e)
        })?;

        let raw = self
            .execute(&method, &url, &uri, payload, sanitized.as_ref(), &options)
            .await?;
        self.decode_success(&method, &url, raw)
    }

    /// Join the base URL, base path, and request path.
    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.base_path,
            path.trim_start_matches('/')
        )
    }

    /// Run the attempt loop until success, a non-retryable failure, or an
    /// exhausted retry budget.
    async fn execute(
        &self,
        method: &Method,
        url: &str,
        uri: &http::Uri,
        payload: Option<Bytes>,
        sanitized: Option<&Value>,
        options: &CallOptions,
    ) -> Result<RawResponse, ApiError> {
        let timeout = options.get_timeout().or(self.default_timeout);
        let max_attempts = self.retry_policy.max_attempts();
        let mut backoff = self.retry_policy.backoff();
        let mut attempt: u32 = 1;

        loop {
            let mut ctx = self.context(method, url, sanitized);
            ctx.insert("attempt".into(), attempt.into());
            self.log_sink.log(LogLevel::Debug, "sending request", &ctx);

            match self.attempt_once(method, uri, &payload, timeout, options).await {
                Ok(raw) => {
                    if raw.status.is_success() {
                        return Ok(raw);
                    }

                    let transient = self.retry_policy.retries_on(raw.status);
                    ctx.insert("status".into(), raw.status.as_u16().into());

                    if transient && attempt < max_attempts {
                        let delay = backoff.next_delay();
                        ctx.insert("delay_ms".into(), (delay.as_millis() as u64).into());
                        self.log_sink
                            .log(LogLevel::Warn, "retrying after transient status", &ctx);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let err =
                        classify_response(raw.status, raw.content_type.as_deref(), &raw.body, transient);
                    ctx.insert("kind".into(), err.kind().as_str().into());
                    let what = if transient {
                        "retries exhausted"
                    } else {
                        "request failed"
                    };
                    self.log_sink.log(LogLevel::Error, what, &ctx);
                    return Err(err);
                }
                Err(failure) => {
                    let timed_out = matches!(failure, AttemptFailure::TimedOut);
                    if attempt < max_attempts {
                        let delay = backoff.next_delay();
                        ctx.insert("delay_ms".into(), (delay.as_millis() as u64).into());
                        self.log_sink.log(
                            LogLevel::Warn,
                            if timed_out {
                                "retrying after timeout"
                            } else {
                                "retrying after transport failure"
                            },
                            &ctx,
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let err = match failure {
                        AttemptFailure::TimedOut => classify_transport(true),
                        AttemptFailure::Connect(e) => classify_transport(false).with_cause(e),
                        AttemptFailure::Body(e) => classify_transport(false).with_cause(e),
                    };
                    ctx.insert("kind".into(), err.kind().as_str().into());
                    self.log_sink.log(LogLevel::Error, "retries exhausted", &ctx);
                    return Err(err);
                }
            }
        }
    }

    /// Issue one transport attempt and collect the response body.
    async fn attempt_once(
        &self,
        method: &Method,
        uri: &http::Uri,
        payload: &Option<Bytes>,
        timeout: Option<Duration>,
        options: &CallOptions,
    ) -> Result<RawResponse, AttemptFailure> {
        let request = self.build_request(method, uri, payload, options);

        let round_trip = async {
            let response = self
                .transport
                .request(request)
                .await
                .map_err(AttemptFailure::Connect)?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(AttemptFailure::Body)?
                .to_bytes();
            Ok(RawResponse {
                status,
                content_type,
                body,
            })
        };

        match timeout {
            Some(t) => tokio::time::timeout(t, round_trip)
                .await
                .map_err(|_| AttemptFailure::TimedOut)?,
            None => round_trip.await,
        }
    }

    /// Assemble the HTTP request for one attempt.
    ///
    /// The credential provider is read here, once per attempt, so a token
    /// swapped in by an external refresh layer is used by later attempts.
    fn build_request(
        &self,
        method: &Method,
        uri: &http::Uri,
        payload: &Option<Bytes>,
        options: &CallOptions,
    ) -> http::Request<RequestBody> {
        let body = match payload {
            Some(bytes) => RequestBody::full(bytes.clone()),
            None => RequestBody::empty(),
        };

        let mut request = http::Request::new(body);
        *request.method_mut() = method.clone();
        *request.uri_mut() = uri.clone();

        let headers = request.headers_mut();
        headers.insert(ACCEPT, application_json());
        if payload.is_some() {
            headers.insert(CONTENT_TYPE, application_json());
        }

        if let Some(token) = self.credentials.token() {
            if let Ok(value) = HeaderValue::try_from(format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        for (name, value) in options.get_headers() {
            if !is_reserved_header(name) {
                headers.insert(name.clone(), value.clone());
            }
        }

        request
    }

    /// Validate a 2xx response and unwrap the envelope payload.
    fn decode_success<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        raw: RawResponse,
    ) -> Result<T, ApiError> {
        let content_type = raw.content_type.as_deref();

        if !is_json_content_type(content_type) {
            let mut ctx = self.context(method, url, None);
            ctx.insert("status".into(), raw.status.as_u16().into());
            ctx.insert(
                "content_type".into(),
                content_type.unwrap_or("<missing>").into(),
            );
            ctx.insert(
                "body".into(),
                sanitize::truncate_body(&String::from_utf8_lossy(&raw.body)).into(),
            );
            self.log_sink
                .log(LogLevel::Error, "non-JSON success response", &ctx);
            return Err(parse_failure(raw.status, content_type, &raw.body));
        }

        let envelope: Envelope = match serde_json::from_slice(&raw.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                let mut ctx = self.context(method, url, None);
                ctx.insert("status".into(), raw.status.as_u16().into());
                ctx.insert(
                    "body".into(),
                    sanitize::truncate_body(&String::from_utf8_lossy(&raw.body)).into(),
                );
                self.log_sink
                    .log(LogLevel::Error, "malformed response envelope", &ctx);
                return Err(ApiError::new(ErrorKind::Parse, messages::PARSE)
                    .with_status(raw.status)
                    .with_cause(e));
            }
        };

        if !envelope.success {
            let mut err = ApiError::new(
                ErrorKind::Client,
                envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| messages::FALLBACK.to_string()),
            )
            .with_status(raw.status);
            if let Some(errors) = envelope.errors {
                err = err.with_errors(errors);
            }
            let mut ctx = self.context(method, url, None);
            ctx.insert("status".into(), raw.status.as_u16().into());
            ctx.insert("kind".into(), err.kind().as_str().into());
            self.log_sink
                .log(LogLevel::Error, "server reported failure", &ctx);
            return Err(err);
        }

        serde_json::from_value(envelope.into_data()).map_err(|e| {
            ApiError::new(ErrorKind::Parse, messages::PARSE)
                .with_status(raw.status)
                .with_cause(e)
        })
    }

    /// Base log context shared by every entry for a call.
    fn context(&self, method: &Method, url: &str, sanitized: Option<&Value>) -> LogContext {
        let mut ctx = LogContext::new();
        ctx.insert("method".into(), method.as_str().into());
        ctx.insert("endpoint".into(), url.into());
        if let Some(body) = sanitized {
            ctx.insert("request_body".into(), body.clone());
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NullSink;

    fn test_client() -> ApiClient {
        ApiClient::builder("https://partneriq.example.com")
            .log_sink(NullSink)
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoint_url_joining() {
        let client = test_client();
        assert_eq!(
            client.endpoint_url("/partners/42"),
            "https://partneriq.example.com/api/v1/partners/42"
        );
        assert_eq!(
            client.endpoint_url("partners/42"),
            "https://partneriq.example.com/api/v1/partners/42"
        );
    }

    #[test]
    fn test_endpoint_url_empty_base_path() {
        let client = ApiClient::builder("https://partneriq.example.com")
            .base_path("")
            .log_sink(NullSink)
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint_url("/health"),
            "https://partneriq.example.com/health"
        );
    }

    #[test]
    fn test_reserved_headers() {
        assert!(is_reserved_header(&http::header::CONTENT_TYPE));
        assert!(is_reserved_header(&http::header::ACCEPT));
        assert!(is_reserved_header(&http::header::AUTHORIZATION));
        assert!(!is_reserved_header(&http::header::HeaderName::from_static(
            "x-request-id"
        )));
    }

    #[test]
    fn test_build_request_headers() {
        use crate::credentials::StaticToken;

        let client = ApiClient::builder("https://partneriq.example.com")
            .credentials(StaticToken::new("t-123"))
            .log_sink(NullSink)
            .build()
            .unwrap();

        let uri: http::Uri = "https://partneriq.example.com/api/v1/partners"
            .parse()
            .unwrap();
        let payload = Some(Bytes::from_static(b"{}"));
        let options = CallOptions::new()
            .header("x-request-id", "abc")
            .header("authorization", "Bearer forged");

        let request = client.build_request(&Method::POST, &uri, &payload, &options);
        assert_eq!(request.headers()[ACCEPT], "application/json");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        // The managed authorization header wins over per-call options
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer t-123");
        assert_eq!(request.headers()["x-request-id"], "abc");
    }

    #[test]
    fn test_build_request_no_body_no_content_type() {
        let client = test_client();
        let uri: http::Uri = "https://partneriq.example.com/api/v1/partners"
            .parse()
            .unwrap();
        let request = client.build_request(&Method::GET, &uri, &None, &CallOptions::default());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_decode_success_unwraps_data() {
        let client = test_client();
        let raw = RawResponse {
            status: StatusCode::OK,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(br#"{"success":true,"data":{"id":7}}"#),
        };
        let value: serde_json::Value = client
            .decode_success(&Method::GET, "https://x/api/v1/y", raw)
            .unwrap();
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn test_decode_success_missing_data_into_unit() {
        let client = test_client();
        let raw = RawResponse {
            status: StatusCode::OK,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(br#"{"success":true}"#),
        };
        client
            .decode_success::<()>(&Method::DELETE, "https://x/api/v1/y", raw)
            .unwrap();
    }

    #[test]
    fn test_decode_success_envelope_failure() {
        let client = test_client();
        let raw = RawResponse {
            status: StatusCode::OK,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(
                br#"{"success":false,"message":"duplicate email","errors":{"email":["taken"]}}"#,
            ),
        };
        let err = client
            .decode_success::<()>(&Method::POST, "https://x/api/v1/y", raw)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.message(), "duplicate email");
        assert!(!err.is_retryable());
        assert!(err.errors().is_some());
    }

    #[test]
    fn test_decode_success_html_body() {
        let client = test_client();
        let raw = RawResponse {
            status: StatusCode::OK,
            content_type: Some("text/html".into()),
            body: Bytes::from_static(b"<html><title>Service Unavailable</title></html>"),
        };
        let err = client
            .decode_success::<()>(&Method::GET, "https://x/api/v1/y", raw)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.message(), "Service Unavailable");
    }

    #[test]
    fn test_decode_success_garbled_json() {
        let client = test_client();
        let raw = RawResponse {
            status: StatusCode::OK,
            content_type: Some("application/json".into()),
            body: Bytes::from_static(b"{not json"),
        };
        let err = client
            .decode_success::<()>(&Method::GET, "https://x/api/v1/y", raw)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.message(), messages::PARSE);
        assert!(err.cause().is_some());
    }
}

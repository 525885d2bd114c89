//! Response construction.
//!
//! Failure responses are uniform: an authentication failure never
//! tells the caller which check failed.

use bytes::Bytes;
use hooksign_auth::ResponseSignature;
use serde::{Deserialize, Serialize};

use crate::body::HookResponseBody;
use crate::dispatch::WebhookReply;

/// Content type for all webhook responses.
pub const CONTENT_TYPE: &str = "application/json";

fn message_json(message: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "message": message }))
        .expect("JSON serialization of a message cannot fail")
}

/// Build a JSON error response with a generic message.
#[must_use]
pub fn error_response(status: http::StatusCode, message: &str) -> http::Response<HookResponseBody> {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(HookResponseBody::from_bytes(message_json(message)))
        .expect("valid error response")
}

/// `401` for any failed verification.
#[must_use]
pub fn unauthorized() -> http::Response<HookResponseBody> {
    error_response(
        http::StatusCode::UNAUTHORIZED,
        "request authentication failed",
    )
}

/// `404` for unknown paths.
#[must_use]
pub fn not_found() -> http::Response<HookResponseBody> {
    error_response(http::StatusCode::NOT_FOUND, "not found")
}

/// `405` for a known path with the wrong method.
#[must_use]
pub fn method_not_allowed() -> http::Response<HookResponseBody> {
    error_response(http::StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

/// `413` when the request body exceeds the configured limit.
#[must_use]
pub fn payload_too_large() -> http::Response<HookResponseBody> {
    error_response(http::StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
}

/// `500` for handler or signing failures.
#[must_use]
pub fn internal_error() -> http::Response<HookResponseBody> {
    error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// Body of the health probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `running` while the service accepts requests.
    pub status: String,
    /// Server version.
    pub version: String,
}

impl HealthStatus {
    /// Status value reported by a serving instance.
    pub const RUNNING: &'static str = "running";

    /// Whether the reporting instance is serving.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == Self::RUNNING
    }
}

/// Health probe response.
#[must_use]
pub fn health(version: &str) -> http::Response<HookResponseBody> {
    let status = HealthStatus {
        status: HealthStatus::RUNNING.to_owned(),
        version: version.to_owned(),
    };
    let json = serde_json::to_vec(&status).expect("JSON serialization of health status cannot fail");
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(HookResponseBody::from_bytes(json))
        .expect("valid health response")
}

/// Assemble a signed reply.
///
/// All signature headers are set on the response before the body is attached,
/// and the body is exactly the bytes covered by `signature`.
///
/// # Errors
///
/// Returns an error if a signature header value is invalid; no partially signed
/// response is produced in that case.
pub fn signed_response(
    reply: WebhookReply,
    signature: &ResponseSignature,
) -> Result<http::Response<HookResponseBody>, hooksign_auth::AuthError> {
    let mut headers = http::HeaderMap::new();
    signature.apply(&mut headers)?;
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );

    let body = match reply.body {
        Some(bytes) => HookResponseBody::from_bytes(bytes),
        None => HookResponseBody::empty(),
    };

    let mut response = http::Response::new(body);
    *response.status_mut() = reply.status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// The body bytes of a reply as they will be signed.
#[must_use]
pub fn reply_bytes(reply: &WebhookReply) -> Option<&[u8]> {
    reply.body.as_ref().map(Bytes::as_ref)
}

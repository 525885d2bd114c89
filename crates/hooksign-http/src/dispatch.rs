//! Webhook handler trait and dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use hooksign_auth::Verified;

use crate::router::WebhookRoute;

/// Error raised by a webhook handler. Always surfaces as `500`.
#[derive(Debug, thiserror::Error)]
#[error("webhook handler failed: {0}")]
pub struct WebhookError(pub String);

impl WebhookError {
    /// Create a handler error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The reply a handler wants to send.
///
/// `body` is `None` when the reply has no payload; such replies are signed
/// without a body segment and sent with no body bytes at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookReply {
    /// Response status.
    pub status: http::StatusCode,
    /// Exact bytes to sign and send, or `None` for no payload.
    pub body: Option<Bytes>,
}

impl WebhookReply {
    /// A `200 OK` reply carrying exactly `body`.
    pub fn with_body(body: impl Into<Bytes>) -> Self {
        Self {
            status: http::StatusCode::OK,
            body: Some(body.into()),
        }
    }

    /// A `200 OK` reply without a payload.
    #[must_use]
    pub fn without_body() -> Self {
        Self {
            status: http::StatusCode::OK,
            body: None,
        }
    }
}

/// Trait that the business logic behind the webhook endpoints must implement.
///
/// The handler is only called for requests whose signature was verified. It
/// receives the same raw body bytes that were verified.
pub trait WebhookHandler: Send + Sync + 'static {
    /// Handle a verified webhook request.
    fn handle(
        &self,
        route: WebhookRoute,
        verified: Verified,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<WebhookReply, WebhookError>> + Send>>;
}

/// Dispatch a verified request to the handler.
pub async fn dispatch_webhook<H: WebhookHandler>(
    handler: &H,
    route: WebhookRoute,
    verified: Verified,
    body: Bytes,
) -> Result<WebhookReply, WebhookError> {
    tracing::debug!(route = %route, endpoint = %verified.endpoint, "dispatching webhook");
    handler.handle(route, verified, body).await
}

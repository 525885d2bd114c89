//! Transaction handler behind the webhook endpoints.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use hooksign_auth::Verified;
use hooksign_http::{WebhookError, WebhookHandler, WebhookReply, WebhookRoute};

/// Reply to an authorization request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationDecision {
    /// `APPROVED` or `REJECTED`.
    pub status: &'static str,
    /// Finer-grained status.
    pub status_detail: &'static str,
    /// Human-readable message.
    pub message: &'static str,
}

impl AuthorizationDecision {
    /// An unconditional approval.
    #[must_use]
    pub fn approved() -> Self {
        Self {
            status: "APPROVED",
            status_detail: "APPROVED",
            message: "Ok",
        }
    }
}

/// Approves every authorization and acknowledges every adjustment.
///
/// Balance checks and ledger updates would live here.
#[derive(Debug, Clone, Default)]
pub struct TransactionHandler;

impl TransactionHandler {
    fn authorize(verified: &Verified) -> Result<WebhookReply, WebhookError> {
        let decision = AuthorizationDecision::approved();
        // Serialize once; these exact bytes are both signed and sent.
        let body = serde_json::to_vec(&decision)
            .map_err(|e| WebhookError::new(format!("failed to encode decision: {e}")))?;
        info!(endpoint = %verified.endpoint, status = decision.status, "authorization processed");
        Ok(WebhookReply::with_body(body))
    }

    fn adjust(verified: &Verified) -> WebhookReply {
        info!(endpoint = %verified.endpoint, "adjustment processed");
        WebhookReply::without_body()
    }
}

impl WebhookHandler for TransactionHandler {
    fn handle(
        &self,
        route: WebhookRoute,
        verified: Verified,
        _body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<WebhookReply, WebhookError>> + Send>> {
        Box::pin(async move {
            match route {
                WebhookRoute::Authorization => Self::authorize(&verified),
                WebhookRoute::Adjustment => Ok(Self::adjust(&verified)),
            }
        })
    }
}

//! Error types for webhook request authentication and response signing.
//!
//! Every verification failure is terminal for the request. The variants are meant
//! for operators (logs, metrics); the HTTP layer collapses all of them into a
//! single opaque authentication failure before anything reaches the remote peer.

/// Errors that can occur while verifying a request or signing a response.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A required header is missing, empty, or not a visible ASCII string.
    #[error("Missing or malformed header: {0}")]
    MalformedRequest(&'static str),

    /// The signature header names an algorithm other than `hmac-sha256`.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key identifier was not found by the key resolver.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// The computed signature does not match the presented signature.
    #[error("Signature does not match")]
    SignatureMismatch,

    /// The request timestamp is unparseable or outside the accepted window.
    #[error("Request timestamp is outside the accepted window")]
    StaleTimestamp,

    /// The response cannot be signed because the key identifier is not resolvable.
    #[error("Cannot sign response: no secret configured for key {0}")]
    SigningConfiguration(String),

    /// A provisioned secret could not be decoded.
    #[error("Invalid secret for key {key_id}: {reason}")]
    InvalidSecret {
        /// The key identifier the secret belongs to.
        key_id: String,
        /// What was wrong with the encoded secret.
        reason: String,
    },

    /// A value destined for a response header is not a valid header value.
    #[error("Invalid value for header {0}")]
    InvalidHeaderValue(&'static str),
}

impl AuthError {
    /// Whether this error means the inbound request must be rejected as unauthenticated.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest(_)
                | Self::UnsupportedAlgorithm(_)
                | Self::UnknownKey(_)
                | Self::SignatureMismatch
                | Self::StaleTimestamp
        )
    }
}

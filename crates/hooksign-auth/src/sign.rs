//! Outbound response signing.
//!
//! A response is signed over `timestamp || endpoint || body`, where the
//! timestamp is always the current time (an inbound timestamp is never echoed)
//! and the body segment is omitted entirely when the response has no payload.
//! The resulting headers must be written before any body bytes, and the body
//! sent must be exactly the bytes that were signed.

use http::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::canonical::SignedEnvelope;
use crate::error::AuthError;
use crate::headers::{X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use crate::keys::KeyResolver;
use crate::signature::Signature;

/// The headers accompanying a signed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSignature {
    /// The endpoint identifier, echoed from the request.
    pub endpoint: String,
    /// Freshly generated decimal Unix seconds.
    pub timestamp: String,
    /// The computed signature.
    pub signature: Signature,
}

impl ResponseSignature {
    /// Insert `X-Endpoint`, `X-Timestamp` and `X-Signature` into `headers`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if the endpoint cannot be carried
    /// in a header. Nothing is inserted in that case.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), AuthError> {
        let endpoint = HeaderValue::from_str(&self.endpoint)
            .map_err(|_| AuthError::InvalidHeaderValue(X_ENDPOINT))?;
        let timestamp = HeaderValue::from_str(&self.timestamp)
            .map_err(|_| AuthError::InvalidHeaderValue(X_TIMESTAMP))?;
        let signature = HeaderValue::from_str(&self.signature.to_header_value())
            .map_err(|_| AuthError::InvalidHeaderValue(X_SIGNATURE))?;

        headers.insert(X_ENDPOINT, endpoint);
        headers.insert(X_TIMESTAMP, timestamp);
        headers.insert(X_SIGNATURE, signature);
        Ok(())
    }
}

/// Sign a response body using the current time.
///
/// Pass `None` for responses without a payload; do not substitute `{}`, `null`
/// or whitespace.
///
/// # Errors
///
/// Returns [`AuthError::SigningConfiguration`] if `key_id` cannot be resolved.
pub fn sign_response(
    body: Option<&[u8]>,
    endpoint: &str,
    key_id: &str,
    key_resolver: &dyn KeyResolver,
) -> Result<ResponseSignature, AuthError> {
    sign_response_at(
        chrono::Utc::now().timestamp(),
        body,
        endpoint,
        key_id,
        key_resolver,
    )
}

/// Sign a response body with an explicit Unix timestamp in seconds.
///
/// # Errors
///
/// Returns [`AuthError::SigningConfiguration`] if `key_id` cannot be resolved.
///
/// # Examples
///
/// ```
/// use hooksign_auth::keys::{KeyPair, StaticKeyResolver};
/// use hooksign_auth::sign::sign_response_at;
///
/// let resolver = StaticKeyResolver::new(vec![KeyPair::new("k1", vec![0u8; 32])]);
/// let signed = sign_response_at(1_700_000_000, None, "orders", "k1", &resolver).unwrap();
/// assert_eq!(signed.timestamp, "1700000000");
/// assert_eq!(
///     signed.signature.to_header_value(),
///     "hmac-sha256 xlnYg4r546qrqxcG3CAv4dWNJT9AnEIkOLUn34V7ArM="
/// );
/// ```
pub fn sign_response_at(
    unix_seconds: i64,
    body: Option<&[u8]>,
    endpoint: &str,
    key_id: &str,
    key_resolver: &dyn KeyResolver,
) -> Result<ResponseSignature, AuthError> {
    let secret = key_resolver
        .resolve(key_id)
        .map_err(|_| AuthError::SigningConfiguration(key_id.to_owned()))?;

    let timestamp = unix_seconds.to_string();
    let signature = SignedEnvelope::new(&timestamp, endpoint, body).sign(&secret);

    debug!(
        key_id,
        endpoint,
        timestamp = %timestamp,
        has_body = body.is_some(),
        "Signed webhook response"
    );

    Ok(ResponseSignature {
        endpoint: endpoint.to_owned(),
        timestamp,
        signature,
    })
}

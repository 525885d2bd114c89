//! Inbound request verification.
//!
//! The verification flow is:
//!
//! 1. Extract the signature headers (see [`SignedRequestHeaders`]).
//! 2. Parse `X-Signature` and reject any algorithm other than `hmac-sha256`,
//!    before any key lookup or cryptographic work.
//! 3. Optionally check the timestamp against a replay window.
//! 4. Resolve the secret for `X-Api-Key`.
//! 5. Compute `HMAC-SHA256(secret, timestamp || endpoint || raw_body)`.
//! 6. Decode the presented digest and compare in constant time.
//!
//! The body must be the exact bytes received on the wire, buffered before any
//! structured decoding.

use std::time::Duration;

use tracing::debug;

use crate::canonical::SignedEnvelope;
use crate::error::AuthError;
use crate::headers::SignedRequestHeaders;
use crate::keys::KeyResolver;
use crate::signature::parse_signature_header;

/// Tunables for request verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Maximum allowed distance between the request timestamp and the current
    /// time. `None` disables the check and leaves the timestamp unparsed.
    pub max_timestamp_skew: Option<Duration>,
}

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// The key identifier whose secret produced the matching signature.
    pub key_id: String,
    /// The endpoint identifier covered by the signature.
    pub endpoint: String,
    /// The timestamp covered by the signature.
    pub timestamp: String,
}

/// Verify the signature of an inbound request.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - The signature header is malformed ([`AuthError::MalformedRequest`])
/// - The algorithm is not `hmac-sha256` ([`AuthError::UnsupportedAlgorithm`])
/// - The timestamp falls outside the configured window ([`AuthError::StaleTimestamp`])
/// - The key identifier is not known ([`AuthError::UnknownKey`])
/// - The signature does not match ([`AuthError::SignatureMismatch`])
pub fn verify_request(
    headers: &SignedRequestHeaders,
    raw_body: &[u8],
    key_resolver: &dyn KeyResolver,
    options: &VerifyOptions,
) -> Result<Verified, AuthError> {
    let presented = parse_signature_header(&headers.signature)?;

    if let Some(max_skew) = options.max_timestamp_skew {
        check_timestamp(&headers.timestamp, chrono::Utc::now().timestamp(), max_skew)?;
    }

    let secret = key_resolver.resolve(&headers.key_id)?;

    debug!(
        key_id = %headers.key_id,
        endpoint = %headers.endpoint,
        timestamp = %headers.timestamp,
        body_len = raw_body.len(),
        "Verifying webhook signature"
    );

    let expected = SignedEnvelope::new(&headers.timestamp, &headers.endpoint, Some(raw_body))
        .sign(&secret);
    let presented_digest = presented.decode()?;

    if expected.matches(&presented_digest) {
        debug!(key_id = %headers.key_id, "Signature verification succeeded");
        Ok(Verified {
            key_id: headers.key_id.clone(),
            endpoint: headers.endpoint.clone(),
            timestamp: headers.timestamp.clone(),
        })
    } else {
        debug!(
            key_id = %headers.key_id,
            provided = %presented.encoded_digest,
            "Signature mismatch"
        );
        Err(AuthError::SignatureMismatch)
    }
}

/// Extract the signature headers from a header map and verify the request.
///
/// # Errors
///
/// Returns [`AuthError::MalformedRequest`] if a signature header is missing, or
/// any error from [`verify_request`].
pub fn verify_header_map(
    headers: &http::HeaderMap,
    raw_body: &[u8],
    key_resolver: &dyn KeyResolver,
    options: &VerifyOptions,
) -> Result<Verified, AuthError> {
    let headers = SignedRequestHeaders::from_header_map(headers)?;
    verify_request(&headers, raw_body, key_resolver, options)
}

fn check_timestamp(timestamp: &str, now: i64, max_skew: Duration) -> Result<(), AuthError> {
    let sent: i64 = timestamp.parse().map_err(|_| AuthError::StaleTimestamp)?;
    if now.abs_diff(sent) > max_skew.as_secs() {
        return Err(AuthError::StaleTimestamp);
    }
    Ok(())
}

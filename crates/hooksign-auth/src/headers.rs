//! Signature metadata headers.
//!
//! Inbound requests carry four headers; outbound responses carry three (the key
//! identifier is not echoed). Header names are matched case-insensitively by
//! `http::HeaderMap`.

use http::HeaderMap;

use crate::error::AuthError;

/// Opaque endpoint identifier, hashed verbatim.
pub const X_ENDPOINT: &str = "x-endpoint";
/// Decimal Unix seconds, hashed verbatim.
pub const X_TIMESTAMP: &str = "x-timestamp";
/// Key identifier selecting the HMAC secret.
pub const X_API_KEY: &str = "x-api-key";
/// `"<algorithm> <base64 digest>"`.
pub const X_SIGNATURE: &str = "x-signature";

/// The signature metadata of an inbound request, validated once at the boundary.
///
/// Every field is guaranteed present and non-empty, so downstream code never has
/// to re-check presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequestHeaders {
    /// Value of `X-Endpoint`.
    pub endpoint: String,
    /// Value of `X-Timestamp`, untouched.
    pub timestamp: String,
    /// Value of `X-Api-Key`.
    pub key_id: String,
    /// Raw value of `X-Signature`.
    pub signature: String,
}

impl SignedRequestHeaders {
    /// Extract and validate the signature headers from a header map.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedRequest`] naming the first header that is
    /// missing, empty, or not visible ASCII.
    pub fn from_header_map(headers: &HeaderMap) -> Result<Self, AuthError> {
        Ok(Self {
            endpoint: required(headers, X_ENDPOINT)?,
            timestamp: required(headers, X_TIMESTAMP)?,
            key_id: required(headers, X_API_KEY)?,
            signature: required(headers, X_SIGNATURE)?,
        })
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<String, AuthError> {
    let value = headers
        .get(name)
        .ok_or(AuthError::MalformedRequest(name))?
        .to_str()
        .map_err(|_| AuthError::MalformedRequest(name))?;

    if value.is_empty() {
        return Err(AuthError::MalformedRequest(name));
    }

    Ok(value.to_owned())
}

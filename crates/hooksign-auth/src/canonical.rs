//! Signed payload construction.
//!
//! The bytes covered by a signature are the plain concatenation
//!
//! ```text
//! timestamp || endpoint || body
//! ```
//!
//! with no delimiters and no re-encoding of any component. When a message has
//! no payload the body segment is left out entirely. An empty body (`Some(b"")`)
//! contributes zero bytes too, but callers must still keep the two cases apart:
//! `{}`, `null` or a blank space are different byte sequences and would make the
//! digest irreproducible for the counterparty.

use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;

use crate::keys::SecretKey;
use crate::signature::Signature;

type HmacSha256 = Hmac<Sha256>;

/// The ordered fields covered by a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedEnvelope<'a> {
    /// Decimal Unix seconds, exactly as received or generated.
    pub timestamp: &'a str,
    /// Opaque endpoint identifier, echoed verbatim.
    pub endpoint: &'a str,
    /// Raw body bytes, or `None` when the message carries no payload.
    pub body: Option<&'a [u8]>,
}

impl<'a> SignedEnvelope<'a> {
    /// Create an envelope from its three components.
    #[must_use]
    pub fn new(timestamp: &'a str, endpoint: &'a str, body: Option<&'a [u8]>) -> Self {
        Self {
            timestamp,
            endpoint,
            body,
        }
    }

    /// The exact byte sequence fed to the HMAC.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooksign_auth::canonical::SignedEnvelope;
    ///
    /// let envelope = SignedEnvelope::new("1700000000", "orders", Some(&br#"{"a":1}"#[..]));
    /// assert_eq!(envelope.to_bytes(), br#"1700000000orders{"a":1}"#);
    ///
    /// let envelope = SignedEnvelope::new("1700000000", "orders", None);
    /// assert_eq!(envelope.to_bytes(), b"1700000000orders");
    /// ```
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body.unwrap_or_default();
        let mut out = Vec::with_capacity(self.timestamp.len() + self.endpoint.len() + body.len());
        out.extend_from_slice(self.timestamp.as_bytes());
        out.extend_from_slice(self.endpoint.as_bytes());
        if let Some(body) = self.body {
            out.extend_from_slice(body);
        }
        out
    }

    /// Compute the HMAC-SHA256 signature of this envelope.
    ///
    /// The components are streamed into the MAC in order without building an
    /// intermediate buffer.
    #[must_use]
    pub fn sign(&self, secret: &SecretKey) -> Signature {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can accept keys of any length");
        mac.update(self.timestamp.as_bytes());
        mac.update(self.endpoint.as_bytes());
        if let Some(body) = self.body {
            mac.update(body);
        }
        let mut digest = [0u8; Signature::DIGEST_LEN];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        Signature::from_digest(digest)
    }
}

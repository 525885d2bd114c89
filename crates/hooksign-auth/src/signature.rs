//! The `X-Signature` header value.
//!
//! Format:
//!
//! ```text
//! hmac-sha256 <base64(HMAC-SHA256(secret, timestamp || endpoint || body))>
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

/// The only algorithm tag this protocol version accepts or emits.
pub const ALGORITHM_TAG: &str = "hmac-sha256";

/// A computed HMAC-SHA256 signature.
///
/// Equality between two signatures is constant time, like [`Signature::matches`].
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    digest: [u8; Self::DIGEST_LEN],
}

impl Signature {
    /// Length in bytes of an HMAC-SHA256 digest.
    pub const DIGEST_LEN: usize = 32;

    /// Wrap a raw digest.
    #[must_use]
    pub fn from_digest(digest: [u8; Self::DIGEST_LEN]) -> Self {
        Self { digest }
    }

    /// The raw digest bytes.
    #[must_use]
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// The base64 transport encoding of the digest.
    #[must_use]
    pub fn encode(&self) -> String {
        BASE64.encode(self.digest)
    }

    /// The full header value, `"<algorithm> <base64 digest>"`.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        format!("{ALGORITHM_TAG} {}", self.encode())
    }

    /// Compare against a presented digest in constant time.
    ///
    /// Uses [`subtle::ConstantTimeEq`], whose running time does not depend on the
    /// position of the first differing byte. A length mismatch fails without
    /// inspecting the contents.
    #[must_use]
    pub fn matches(&self, presented: &[u8]) -> bool {
        self.digest.as_slice().ct_eq(presented).into()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.digest)
    }
}

impl Eq for Signature {}

/// A signature header as presented by the counterparty, split but not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedSignature {
    /// The base64-encoded digest.
    pub encoded_digest: String,
}

impl PresentedSignature {
    /// Decode the presented digest into raw bytes.
    ///
    /// An undecodable digest can never match and is reported as
    /// [`AuthError::SignatureMismatch`].
    pub fn decode(&self) -> Result<Vec<u8>, AuthError> {
        BASE64
            .decode(&self.encoded_digest)
            .map_err(|_| AuthError::SignatureMismatch)
    }
}

/// Parse a `X-Signature` header value.
///
/// The algorithm tag is checked before anything else so that an unsupported
/// scheme is rejected without any key lookup or cryptographic work.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if the tag is not `hmac-sha256`,
/// or [`AuthError::MalformedRequest`] if the digest token is missing.
///
/// # Examples
///
/// ```
/// use hooksign_auth::signature::parse_signature_header;
///
/// let presented = parse_signature_header("hmac-sha256 whk5MLlMd+zJBkEDGa9LYZVUsNsdKWJ94Qm3EXy6VK8=").unwrap();
/// assert_eq!(presented.encoded_digest, "whk5MLlMd+zJBkEDGa9LYZVUsNsdKWJ94Qm3EXy6VK8=");
///
/// assert!(parse_signature_header("hmac-sha1 abc=").is_err());
/// ```
pub fn parse_signature_header(header: &str) -> Result<PresentedSignature, AuthError> {
    let (algorithm, digest) = match header.split_once(' ') {
        Some((algorithm, digest)) => (algorithm, Some(digest)),
        None => (header, None),
    };

    if algorithm != ALGORITHM_TAG {
        return Err(AuthError::UnsupportedAlgorithm(algorithm.to_owned()));
    }

    match digest {
        Some(digest) if !digest.is_empty() => Ok(PresentedSignature {
            encoded_digest: digest.to_owned(),
        }),
        _ => Err(AuthError::MalformedRequest(crate::headers::X_SIGNATURE)),
    }
}

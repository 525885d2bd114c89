//! Key resolution.
//!
//! This module defines the [`KeyResolver`] trait for looking up HMAC secrets by key
//! identifier, a [`StaticKeyResolver`] holding an immutable key set, and a
//! [`KeyRing`] whose key set can be rotated at runtime by swapping the whole
//! snapshot at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use parking_lot::RwLock;

use crate::error::AuthError;

/// Raw HMAC secret bytes.
///
/// The bytes are kept exactly as decoded and are never rendered as text; the
/// `Debug` implementation only reports the length.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Arc<[u8]>);

impl SecretKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    /// The raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes>)", self.0.len())
    }
}

/// A key identifier together with its decoded secret.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The opaque key identifier carried in the `X-Api-Key` header.
    pub key_id: String,
    /// The decoded secret.
    pub secret: SecretKey,
}

impl KeyPair {
    /// Create a key pair from an already decoded secret.
    pub fn new(key_id: impl Into<String>, secret: impl Into<Arc<[u8]>>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: SecretKey::new(secret),
        }
    }

    /// Create a key pair from a standard-base64 encoded secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSecret`] if the secret is not valid base64 or
    /// decodes to zero bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use hooksign_auth::keys::KeyPair;
    ///
    /// let pair = KeyPair::from_base64("my-key", "AAAA").unwrap();
    /// assert_eq!(pair.secret.as_bytes(), &[0, 0, 0]);
    /// assert!(KeyPair::from_base64("my-key", "not base64!").is_err());
    /// ```
    pub fn from_base64(key_id: impl Into<String>, encoded: &str) -> Result<Self, AuthError> {
        let key_id = key_id.into();
        let decoded = BASE64
            .decode(encoded.trim())
            .map_err(|e| AuthError::InvalidSecret {
                key_id: key_id.clone(),
                reason: e.to_string(),
            })?;
        if decoded.is_empty() {
            return Err(AuthError::InvalidSecret {
                key_id,
                reason: "secret is empty".to_owned(),
            });
        }
        Ok(Self::new(key_id, decoded))
    }
}

/// Trait for looking up HMAC secrets by key identifier.
///
/// Implementations must not log or otherwise expose secret material, and must
/// never fall back to a default key.
pub trait KeyResolver: Send + Sync {
    /// Resolve the secret for the given key identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownKey`] if the key identifier is not recognized.
    fn resolve(&self, key_id: &str) -> Result<SecretKey, AuthError>;
}

/// An immutable in-memory key set.
///
/// # Examples
///
/// ```
/// use hooksign_auth::keys::{KeyPair, KeyResolver, StaticKeyResolver};
///
/// let resolver = StaticKeyResolver::new(vec![KeyPair::new("k1", vec![1u8; 32])]);
/// assert!(resolver.resolve("k1").is_ok());
/// assert!(resolver.resolve("k2").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticKeyResolver {
    keys: HashMap<String, SecretKey>,
}

impl StaticKeyResolver {
    /// Build a key set from key pairs. A later pair with the same identifier wins.
    pub fn new(pairs: impl IntoIterator<Item = KeyPair>) -> Self {
        Self {
            keys: pairs
                .into_iter()
                .map(|pair| (pair.key_id, pair.secret))
                .collect(),
        }
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyResolver for StaticKeyResolver {
    fn resolve(&self, key_id: &str) -> Result<SecretKey, AuthError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(key_id.to_owned()))
    }
}

/// A rotatable key set.
///
/// Lookups run against an immutable snapshot. [`KeyRing::rotate`] builds the
/// replacement set up front and swaps the snapshot pointer, so concurrent
/// readers observe either the old set or the new one, never a mix. The lock
/// only guards the pointer clone/swap.
#[derive(Debug, Default)]
pub struct KeyRing {
    current: RwLock<Arc<StaticKeyResolver>>,
}

impl KeyRing {
    /// Create a key ring with an initial key set.
    pub fn new(pairs: impl IntoIterator<Item = KeyPair>) -> Self {
        Self {
            current: RwLock::new(Arc::new(StaticKeyResolver::new(pairs))),
        }
    }

    /// The current key set snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StaticKeyResolver> {
        Arc::clone(&self.current.read())
    }

    /// Replace the whole key set, returning the number of keys now active.
    pub fn rotate(&self, pairs: impl IntoIterator<Item = KeyPair>) -> usize {
        let next = Arc::new(StaticKeyResolver::new(pairs));
        let len = next.len();
        *self.current.write() = next;
        tracing::info!(keys = len, "rotated webhook key set");
        len
    }
}

impl KeyResolver for KeyRing {
    fn resolve(&self, key_id: &str) -> Result<SecretKey, AuthError> {
        self.snapshot().resolve(key_id)
    }
}

impl<R: KeyResolver + ?Sized> KeyResolver for Arc<R> {
    fn resolve(&self, key_id: &str) -> Result<SecretKey, AuthError> {
        (**self).resolve(key_id)
    }
}

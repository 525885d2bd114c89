//! HMAC-SHA256 webhook request authentication for HookSign.
//!
//! This crate implements both halves of a mutual webhook authentication scheme:
//! verifying that an inbound request was signed by a trusted counterparty, and
//! signing the outbound response so the counterparty can verify it in turn.
//!
//! # Overview
//!
//! Every message is signed over the plain concatenation of its timestamp,
//! endpoint identifier and raw body bytes:
//!
//! ```text
//! X-Signature: hmac-sha256 base64(HMAC-SHA256(secret, timestamp || endpoint || body))
//! ```
//!
//! The secret is selected by the `X-Api-Key` header. Responses without a payload
//! omit the body segment entirely.
//!
//! # Usage
//!
//! ```rust
//! use hooksign_auth::keys::{KeyPair, StaticKeyResolver};
//! use hooksign_auth::sign::sign_response_at;
//! use hooksign_auth::verify::{VerifyOptions, verify_request};
//! use hooksign_auth::SignedRequestHeaders;
//!
//! let keys = StaticKeyResolver::new(vec![KeyPair::new("key-1", vec![0u8; 32])]);
//!
//! let signed = sign_response_at(1_700_000_000, Some(&b"{}"[..]), "orders", "key-1", &keys).unwrap();
//! let headers = SignedRequestHeaders {
//!     endpoint: signed.endpoint.clone(),
//!     timestamp: signed.timestamp.clone(),
//!     key_id: "key-1".to_owned(),
//!     signature: signed.signature.to_header_value(),
//! };
//! assert!(verify_request(&headers, b"{}", &keys, &VerifyOptions::default()).is_ok());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Signed byte construction and HMAC computation
//! - [`error`] - Authentication error types
//! - [`headers`] - Header names and the validated request header record
//! - [`keys`] - Key resolver trait, static and rotatable key sets
//! - [`sign`] - Outbound response signing
//! - [`signature`] - `X-Signature` parsing, encoding and constant-time comparison
//! - [`verify`] - Inbound request verification

pub mod canonical;
pub mod error;
pub mod headers;
pub mod keys;
pub mod sign;
pub mod signature;
pub mod verify;

pub use error::AuthError;
pub use headers::SignedRequestHeaders;
pub use keys::{KeyPair, KeyResolver, KeyRing, SecretKey, StaticKeyResolver};
pub use sign::{ResponseSignature, sign_response, sign_response_at};
pub use signature::{ALGORITHM_TAG, Signature};
pub use verify::{Verified, VerifyOptions, verify_header_map, verify_request};

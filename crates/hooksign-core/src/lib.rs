//! Configuration and key provisioning for HookSign.
//!
//! This crate loads the service configuration from the environment and turns
//! the provisioned key material into decoded [`KeyPair`](hooksign_auth::KeyPair)s
//! ready for a key resolver.

mod config;
mod error;
mod keys;

pub use config::HookSignConfig;
pub use error::{HookSignError, HookSignResult};
pub use keys::{load_key_pairs, parse_inline_keys, read_keys_file};

//! Key provisioning.
//!
//! Keys come from two places, which are merged:
//!
//! - `HOOKSIGN_API_KEYS`: `keyId:base64Secret` entries separated by commas.
//!   Standard base64 never contains `:` or `,`, so key ids that are themselves
//!   base64 work unchanged.
//! - `HOOKSIGN_KEYS_FILE`: a JSON object `{ "<keyId>": "<base64Secret>" }`.
//!
//! Secrets are decoded into raw bytes here and never handled as text afterwards.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use hooksign_auth::KeyPair;

use crate::config::HookSignConfig;
use crate::error::{HookSignError, HookSignResult};

/// Parse inline `keyId:base64Secret[,keyId:base64Secret...]` key pairs.
///
/// # Errors
///
/// Returns [`HookSignError::Config`] for an entry without a `:` or with an
/// empty key id, and [`HookSignError::Key`] for an undecodable secret.
///
/// # Examples
///
/// ```
/// use hooksign_core::parse_inline_keys;
///
/// let pairs = parse_inline_keys("k1:AAAA, k2:AQID").unwrap();
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[1].secret.as_bytes(), &[1, 2, 3]);
/// ```
pub fn parse_inline_keys(value: &str) -> HookSignResult<Vec<KeyPair>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> HookSignResult<KeyPair> {
            let (key_id, secret) = entry.split_once(':').ok_or_else(|| {
                HookSignError::Config("inline key entries must be keyId:base64Secret".to_owned())
            })?;
            if key_id.is_empty() {
                return Err(HookSignError::Config("inline key id is empty".to_owned()));
            }
            Ok(KeyPair::from_base64(key_id, secret)?)
        })
        .collect()
}

/// Read a JSON key file mapping key ids to base64 secrets.
///
/// # Errors
///
/// Returns [`HookSignError::KeyFile`] if the file cannot be read or is not a
/// JSON object of strings, and [`HookSignError::Key`] for an undecodable secret.
pub fn read_keys_file(path: impl AsRef<Path>) -> HookSignResult<Vec<KeyPair>> {
    let path = path.as_ref();
    let key_file_error = |reason: String| HookSignError::KeyFile {
        path: path.display().to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| key_file_error(e.to_string()))?;
    let entries: BTreeMap<String, String> =
        serde_json::from_str(&contents).map_err(|e| key_file_error(e.to_string()))?;

    entries
        .into_iter()
        .map(|(key_id, secret)| KeyPair::from_base64(key_id, &secret).map_err(HookSignError::from))
        .collect()
}

/// Load every configured key pair.
///
/// # Errors
///
/// Returns an error if any source fails to load, a key id appears twice, or no
/// key is configured at all.
pub fn load_key_pairs(config: &HookSignConfig) -> HookSignResult<Vec<KeyPair>> {
    let mut pairs = Vec::new();

    if let Some(inline) = &config.api_keys {
        pairs.extend(parse_inline_keys(inline)?);
    }
    if let Some(path) = &config.keys_file {
        pairs.extend(read_keys_file(path)?);
    }

    let mut seen = HashSet::new();
    for pair in &pairs {
        if !seen.insert(pair.key_id.as_str()) {
            return Err(HookSignError::Config(format!(
                "duplicate key id: {}",
                pair.key_id
            )));
        }
    }

    if pairs.is_empty() {
        return Err(HookSignError::Config(
            "no keys configured; set HOOKSIGN_API_KEYS or HOOKSIGN_KEYS_FILE".to_owned(),
        ));
    }

    tracing::debug!(keys = pairs.len(), "loaded webhook keys");
    Ok(pairs)
}

//! HookSign service configuration.
//!
//! All configuration is driven by environment variables. See
//! [`HookSignConfig::from_env`] for the full list.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Service configuration.
///
/// # Examples
///
/// ```
/// use hooksign_core::HookSignConfig;
///
/// let config = HookSignConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:1080");
/// assert!(config.max_timestamp_skew_secs.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct HookSignConfig {
    /// Bind address (e.g. `"0.0.0.0:1080"`).
    #[builder(default = String::from("0.0.0.0:1080"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Inline key pairs, `keyId:base64Secret` entries separated by commas.
    ///
    /// Skipped on serialization so secrets never end up in dumped config.
    #[builder(default, setter(strip_option))]
    #[serde(skip_serializing, default)]
    pub api_keys: Option<String>,

    /// Path to a JSON key file mapping key ids to base64 secrets.
    #[builder(default, setter(strip_option))]
    pub keys_file: Option<String>,

    /// Replay window for inbound timestamps, in seconds. Disabled when unset.
    #[builder(default, setter(strip_option))]
    pub max_timestamp_skew_secs: Option<u64>,

    /// Largest request body buffered for verification, in bytes.
    #[builder(default = DEFAULT_MAX_BODY_BYTES)]
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Default request body limit (1 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for HookSignConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:1080"),
            log_level: String::from("info"),
            api_keys: None,
            keys_file: None,
            max_timestamp_skew_secs: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HookSignConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:1080` |
    /// | `LOG_LEVEL` | `info` |
    /// | `HOOKSIGN_API_KEYS` | *(unset)* |
    /// | `HOOKSIGN_KEYS_FILE` | *(unset)* |
    /// | `HOOKSIGN_MAX_TIMESTAMP_SKEW_SECS` | *(unset)* |
    /// | `HOOKSIGN_MAX_BODY_BYTES` | `1048576` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("HOOKSIGN_API_KEYS") {
            config.api_keys = Some(v);
        }
        if let Ok(v) = std::env::var("HOOKSIGN_KEYS_FILE") {
            config.keys_file = Some(v);
        }
        if let Ok(v) = std::env::var("HOOKSIGN_MAX_TIMESTAMP_SKEW_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.max_timestamp_skew_secs = Some(n);
            } else {
                tracing::warn!(value = %v, "ignoring invalid HOOKSIGN_MAX_TIMESTAMP_SKEW_SECS");
            }
        }

        if let Ok(v) = std::env::var("HOOKSIGN_MAX_BODY_BYTES") {
            match v.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_bytes = n,
                _ => tracing::warn!(value = %v, "ignoring invalid HOOKSIGN_MAX_BODY_BYTES"),
            }
        }

        config
    }

    /// The replay window as a [`Duration`], if enabled.
    #[must_use]
    pub fn max_timestamp_skew(&self) -> Option<Duration> {
        self.max_timestamp_skew_secs.map(Duration::from_secs)
    }
}

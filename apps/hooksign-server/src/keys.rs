//! Key ring setup and live rotation.
//!
//! On `SIGHUP` the configured key sources are re-read and, if they load
//! cleanly, swapped in as a whole. A failed reload keeps the current keys.

use std::sync::Arc;

use anyhow::{Context, Result};
use hooksign_auth::KeyRing;
use hooksign_core::{HookSignConfig, load_key_pairs};
use tracing::{error, info};

/// Build the key ring from the configured key sources.
pub fn build_key_ring(config: &HookSignConfig) -> Result<Arc<KeyRing>> {
    let pairs = load_key_pairs(config).context("failed to load webhook keys")?;
    info!(keys = pairs.len(), "configured webhook keys");
    Ok(Arc::new(KeyRing::new(pairs)))
}

/// Re-read the key sources and rotate the ring. Returns the number of active keys.
pub fn reload_keys(ring: &KeyRing, config: &HookSignConfig) -> Result<usize> {
    let pairs = load_key_pairs(config).context("failed to reload webhook keys")?;
    Ok(ring.rotate(pairs))
}

/// Spawn a task that reloads the key ring on every `SIGHUP`.
#[cfg(unix)]
pub fn spawn_reload_on_sighup(ring: Arc<KeyRing>, config: HookSignConfig) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangups = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;

    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            match reload_keys(&ring, &config) {
                Ok(keys) => info!(keys, "reloaded webhook keys"),
                Err(e) => error!(error = %format!("{e:#}"), "key reload failed, keeping current keys"),
            }
        }
    });

    Ok(())
}

/// Key reload is driven by `SIGHUP`, which only exists on unix.
#[cfg(not(unix))]
pub fn spawn_reload_on_sighup(_ring: Arc<KeyRing>, _config: HookSignConfig) -> Result<()> {
    Ok(())
}

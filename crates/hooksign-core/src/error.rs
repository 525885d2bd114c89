//! Error types for the HookSign core.

/// Core error type for HookSign configuration and key provisioning.
#[derive(Debug, thiserror::Error)]
pub enum HookSignError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The key file could not be read or parsed.
    #[error("key file {path}: {reason}")]
    KeyFile {
        /// Path of the key file.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// A provisioned key could not be decoded.
    #[error(transparent)]
    Key(#[from] hooksign_auth::AuthError),
}

/// Convenience result type for HookSign core operations.
pub type HookSignResult<T> = Result<T, HookSignError>;

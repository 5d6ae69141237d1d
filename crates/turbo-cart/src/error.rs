//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// The configured storage strategy name is not registered.
    #[error("Unknown cart storage strategy: {0}")]
    UnknownStrategy(String),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence was attempted before the cart was identified.
    #[error("Cart has not been identified")]
    Unidentified,

    /// Request data carries no `__extras.username`.
    #[error("Request data has no username")]
    MissingUsername,

    /// The operation needs an authenticated user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The caller may not access another user's cart.
    #[error("{actor} may not access the cart of {target}")]
    Forbidden { actor: String, target: String },

    /// Stored cart was written in a format this build cannot read.
    #[error("Unsupported cart format version: {0}")]
    UnsupportedFormat(u32),

    /// Cart key contains the `:` key separator.
    #[error("Invalid cart key: {0}")]
    InvalidKey(String),

    /// Action payload is missing a required field.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Key-Value store error.
    #[error("Cache error: {0}")]
    Cache(#[from] turbo_cache::CacheError),

    /// User action error.
    #[error("User action failed: {0}")]
    Auth(#[from] turbo_auth::AuthError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CartError {
    /// Check if this error means the deployment is misconfigured.
    pub fn is_config_error(&self) -> bool {
        matches!(self, CartError::UnknownStrategy(_) | CartError::Config(_))
    }
}

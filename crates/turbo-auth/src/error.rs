//! Authentication and user-action errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// User already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// Insufficient permissions.
    #[error("insufficient permissions: {user} may not {action}")]
    InsufficientPermissions { user: String, action: String },

    /// Cache error.
    #[error("cache error: {0}")]
    Cache(#[from] turbo_cache::CacheError),
}

impl AuthError {
    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions { .. })
    }
}

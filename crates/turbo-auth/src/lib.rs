//! Users and user actions for TurboCart.
//!
//! Models the host platform's user store: who is making a request
//! ([`User`]), the stored [`UserProfile`] with its extension-owned
//! `plugin_extras`, and the authorized lookup/update actions behind
//! [`UserDirectory`].

mod directory;
mod error;
mod user;

pub use directory::{ActionContext, KvUserDirectory, UserDirectory};
pub use error::AuthError;
pub use user::{User, UserId, UserProfile};

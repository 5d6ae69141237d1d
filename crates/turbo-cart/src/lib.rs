//! Pluggable shopping carts for TurboCommerce extensions.
//!
//! A [`Cart`] holds items (id to free-form details) and delegates
//! persistence to one of the registered storage strategies:
//!
//! - **redis**: a Key-Value store entry per cart ([`CacheStorage`])
//! - **session**: the platform session ([`SessionStorage`])
//! - **user_plugin_extras**: the owning user's profile ([`ProfileStorage`])
//!
//! The strategy is chosen by configuration through [`CartFactory`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use turbo_auth::User;
//! use turbo_cache::{Session, SessionId};
//! use turbo_cart::prelude::*;
//!
//! let factory = CartFactory::new(CartConfig::default());
//! let mut ctx = RequestContext::new(User::anonymous())
//!     .with_session(Session::new(SessionId::new("s-1")));
//!
//! let mut cart = factory.get_cart("session", &ctx, json!({})).unwrap();
//! cart.restore(&mut ctx, "default").unwrap();
//! cart.add("widget", json!({"qty": 2}).as_object().cloned().unwrap());
//! cart.save(&mut ctx, "default").unwrap();
//!
//! let mut again = factory.get_cart("session", &ctx, json!({})).unwrap();
//! again.restore(&mut ctx, "default").unwrap();
//! assert_eq!(again.len(), 1);
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod storage;

mod cart;
mod context;
mod factory;
mod item;

pub use cart::Cart;
pub use config::{CacheKeyspace, CartConfig, ProfileAccess};
pub use context::{RequestContext, Scope};
pub use error::CartError;
pub use factory::{CartFactory, StrategyKind};
pub use item::{Content, Details, Item};
pub use storage::{CacheStorage, CartStorage, ProfileStorage, SessionStorage};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::actions::{
        shopping_cart_add, shopping_cart_clear, shopping_cart_pop, shopping_cart_show,
        CartPayload,
    };
    pub use crate::config::{CartConfig, ProfileAccess};
    pub use crate::error::CartError;
    pub use crate::{Cart, CartFactory, Content, Details, Item, RequestContext, Scope};
}

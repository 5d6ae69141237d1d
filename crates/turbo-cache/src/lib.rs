//! Key-Value layer for TurboCart.
//!
//! Provides the raw [`KvStore`] backends carts are persisted in, a typed
//! [`Cache`] with automatic JSON serialization, and KV-backed platform
//! [`Session`]s.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use turbo_cache::{Cache, MemoryStore};
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//!
//! cache.set("greeting", &"hello").unwrap();
//! let value: Option<String> = cache.get("greeting").unwrap();
//! assert_eq!(value.as_deref(), Some("hello"));
//!
//! cache.delete("greeting").unwrap();
//! ```

mod error;
mod kv;
mod session;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionId, SessionStore};
#[cfg(target_arch = "wasm32")]
pub use store::SpinStore;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KvStore, MemoryStore, Session, SessionId, SessionStore};
}

//! Key-Value store backed carts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use turbo_cache::{cache_key, Cache};

use super::CartStorage;
use crate::config::CacheKeyspace;
use crate::context::RequestContext;
use crate::error::CartError;
use crate::item::Content;

/// Version written into every stored cart.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    content: &'a Content,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(default)]
    content: Value,
}

/// Encode content into the stored cart format.
pub fn encode_content(content: &Content) -> Result<Vec<u8>, CartError> {
    Ok(serde_json::to_vec(&EnvelopeRef {
        version: FORMAT_VERSION,
        content,
    })?)
}

/// Decode a stored cart, rejecting versions this build does not know.
pub fn decode_content(bytes: &[u8]) -> Result<Content, CartError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    if envelope.version != FORMAT_VERSION {
        return Err(CartError::UnsupportedFormat(envelope.version));
    }
    super::content_from_value(Some(&envelope.content))
}

/// Carts stored as individual Key-Value entries.
///
/// The entry for cart `key` lives at
/// `<namespace>:<site-id>:<extension>:<cart-type>:<identity>:<key>`.
/// Cart keys may not contain `:`, so the last segment is always the key
/// even when an identity contains separators.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    cache: Cache,
    site_id: String,
    keyspace: CacheKeyspace,
}

impl CacheStorage {
    /// Create a cache-backed strategy.
    pub fn new(cache: Cache, site_id: impl Into<String>, keyspace: CacheKeyspace) -> Self {
        Self {
            cache,
            site_id: site_id.into(),
            keyspace,
        }
    }

    /// Full backend key for one cart.
    pub fn backend_key(&self, identity: &str, key: &str) -> Result<String, CartError> {
        if key.contains(':') {
            return Err(CartError::InvalidKey(key.to_string()));
        }
        Ok(cache_key!(
            self.keyspace.namespace.as_str(),
            self.site_id,
            self.keyspace.extension,
            self.keyspace.cart_type,
            identity,
            key
        ))
    }
}

impl CartStorage for CacheStorage {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn restore(
        &self,
        _ctx: &mut RequestContext,
        identity: &str,
        key: &str,
    ) -> Result<Content, CartError> {
        let backend_key = self.backend_key(identity, key)?;
        match self.cache.get_raw(&backend_key)? {
            Some(bytes) if !bytes.is_empty() => decode_content(&bytes),
            _ => {
                tracing::debug!(key = %backend_key, "no stored cart");
                Ok(Content::new())
            }
        }
    }

    fn save(
        &self,
        _ctx: &mut RequestContext,
        identity: &str,
        key: &str,
        content: &Content,
    ) -> Result<(), CartError> {
        let backend_key = self.backend_key(identity, key)?;
        self.cache.set_raw(&backend_key, &encode_content(content)?)?;
        Ok(())
    }

    fn discard(
        &self,
        _ctx: &mut RequestContext,
        identity: &str,
        key: &str,
    ) -> Result<(), CartError> {
        self.cache.delete(&self.backend_key(identity, key)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use turbo_auth::User;
    use turbo_cache::MemoryStore;

    fn storage() -> (CacheStorage, Cache) {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let storage = CacheStorage::new(cache.clone(), "site-1", CacheKeyspace::default());
        (storage, cache)
    }

    fn content(value: Value) -> Content {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_backend_key_layout() {
        let (storage, _) = storage();
        assert_eq!(
            storage.backend_key("alice", "default").unwrap(),
            "turbo:site-1:turbo_cart:shopping_cart:alice:default"
        );
    }

    #[test]
    fn test_separator_in_cart_key_is_rejected() {
        let (storage, _) = storage();
        let mut ctx = RequestContext::new(User::anonymous());

        let result = storage.backend_key("a", "b:c");
        assert!(matches!(result, Err(CartError::InvalidKey(ref key)) if key == "b:c"));
        assert!(matches!(
            storage.save(&mut ctx, "a", "b:c", &Content::new()),
            Err(CartError::InvalidKey(_))
        ));

        // Identities may contain separators; the key segment stays unambiguous.
        assert_eq!(
            storage.backend_key("a:b", "c").unwrap(),
            "turbo:site-1:turbo_cart:shopping_cart:a:b:c"
        );
    }

    #[test]
    fn test_encoding_is_versioned() {
        let bytes = encode_content(&content(json!({"w": {"qty": 2}}))).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({"version": 1, "content": {"w": {"qty": 2}}}));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let result = decode_content(br#"{"version": 2, "content": {}}"#);
        assert!(matches!(result, Err(CartError::UnsupportedFormat(2))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_content(b"\x80\x04pickle");
        assert!(matches!(result, Err(CartError::Serialization(_))));
    }

    #[test]
    fn test_save_restore_discard() {
        let (storage, cache) = storage();
        let mut ctx = RequestContext::new(User::anonymous());
        let stored = content(json!({"w": {"qty": 2}, "g": {}}));

        storage.save(&mut ctx, "alice", "default", &stored).unwrap();
        assert!(cache
            .exists("turbo:site-1:turbo_cart:shopping_cart:alice:default")
            .unwrap());
        assert_eq!(storage.restore(&mut ctx, "alice", "default").unwrap(), stored);

        storage.discard(&mut ctx, "alice", "default").unwrap();
        assert!(storage.restore(&mut ctx, "alice", "default").unwrap().is_empty());
    }

    #[test]
    fn test_empty_value_restores_empty() {
        let (storage, cache) = storage();
        let mut ctx = RequestContext::new(User::anonymous());
        cache
            .set_raw(&storage.backend_key("alice", "default").unwrap(), b"")
            .unwrap();
        assert!(storage.restore(&mut ctx, "alice", "default").unwrap().is_empty());
    }

    #[test]
    fn test_keys_isolate_carts() {
        let (storage, _) = storage();
        let mut ctx = RequestContext::new(User::anonymous());
        storage
            .save(&mut ctx, "alice", "dataset", &content(json!({"d": {}})))
            .unwrap();

        assert!(storage.restore(&mut ctx, "alice", "default").unwrap().is_empty());
        assert!(storage.restore(&mut ctx, "bob", "dataset").unwrap().is_empty());
    }

    #[test]
    fn test_discard_missing_is_ok() {
        let (storage, _) = storage();
        let mut ctx = RequestContext::new(User::anonymous());
        assert!(storage.discard(&mut ctx, "nobody", "default").is_ok());
    }
}

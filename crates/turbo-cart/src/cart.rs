//! The cart contract.

use serde_json::Value;
use std::fmt;

use crate::context::{RequestContext, Scope};
use crate::error::CartError;
use crate::item::{Content, Details, Item};
use crate::storage::CartStorage;

/// A shopping cart bound to one storage strategy.
///
/// Carts are built per request. Content is only loaded by
/// [`restore`](Self::restore) and only persisted by [`save`](Self::save);
/// mutations that are not saved are lost with the cart.
pub struct Cart {
    id: Option<String>,
    content: Content,
    data: Value,
    storage: Box<dyn CartStorage>,
}

impl Cart {
    /// Create an empty, unidentified cart over `storage`.
    pub fn new(storage: Box<dyn CartStorage>) -> Self {
        Self {
            id: None,
            content: Content::new(),
            data: Value::Null,
            storage,
        }
    }

    /// Attach the request data (`data_dict`) the cart was requested with.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Cart identity, once identified.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name of the storage strategy.
    pub fn strategy(&self) -> &'static str {
        self.storage.name()
    }

    /// Request data the cart was created with.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Compute and assign the cart identity.
    pub fn identify(&mut self, scope: &Scope, ctx: &RequestContext) -> Result<&str, CartError> {
        let id = self.storage.identify(scope, ctx, &self.data)?;
        tracing::debug!(strategy = self.strategy(), scope = %scope, identity = %id, "cart identified");
        Ok(self.id.insert(id).as_str())
    }

    /// Set `item`'s details, replacing any previous entry.
    pub fn add(&mut self, item: impl Into<String>, details: Details) {
        self.content.insert(item.into(), details);
    }

    /// Remove `item`, returning its details if it was present.
    pub fn pop(&mut self, item: &str) -> Option<Details> {
        self.content.remove(item)
    }

    /// Details of `item`, if present.
    pub fn get(&self, item: &str) -> Option<&Details> {
        self.content.get(item)
    }

    /// One record per item.
    pub fn show(&self) -> Vec<Item> {
        self.content
            .iter()
            .map(|(id, details)| Item::new(id.clone(), details.clone()))
            .collect()
    }

    /// Empty the in-memory content.
    pub fn clear(&mut self) {
        self.content.clear();
    }

    /// Whether the cart holds no items.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// The raw content mapping.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Replace the content with the copy persisted under `key`.
    ///
    /// Nothing persisted means an empty cart.
    pub fn restore(&mut self, ctx: &mut RequestContext, key: &str) -> Result<(), CartError> {
        let id = self.id.as_deref().ok_or(CartError::Unidentified)?;
        self.content = self.storage.restore(ctx, id, key)?;
        tracing::debug!(strategy = self.strategy(), identity = %id, key, items = self.content.len(), "cart restored");
        Ok(())
    }

    /// Persist the content under `key`.
    pub fn save(&self, ctx: &mut RequestContext, key: &str) -> Result<(), CartError> {
        let id = self.id.as_deref().ok_or(CartError::Unidentified)?;
        self.storage.save(ctx, id, key, &self.content)?;
        tracing::debug!(strategy = self.strategy(), identity = %id, key, items = self.content.len(), "cart saved");
        Ok(())
    }

    /// Discard the copy persisted under `key` and empty the cart.
    pub fn drop(&mut self, ctx: &mut RequestContext, key: &str) -> Result<(), CartError> {
        let id = self.id.as_deref().ok_or(CartError::Unidentified)?;
        self.storage.discard(ctx, id, key)?;
        tracing::debug!(strategy = self.strategy(), identity = %id, key, "cart dropped");
        self.content.clear();
        Ok(())
    }
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("id", &self.id)
            .field("strategy", &self.strategy())
            .field("content", &self.content)
            .finish()
    }
}

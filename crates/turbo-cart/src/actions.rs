//! Cart actions exposed to request handlers.
//!
//! Each action resolves a cart for the payload, restores the named cart,
//! applies its change, persists, and answers with the resulting items.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cart::Cart;
use crate::context::RequestContext;
use crate::error::CartError;
use crate::factory::CartFactory;
use crate::item::{Details, Item};

/// Cart name used when a payload does not name one.
pub const DEFAULT_CART: &str = "default";

/// Input shared by all cart actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartPayload {
    /// Cart name.
    #[serde(default = "default_cart")]
    pub cart: String,
    /// Cart scope.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Owner of a profile-backed cart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Item to add or remove.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Details of an added item.
    #[serde(default)]
    pub details: Details,
}

fn default_cart() -> String {
    DEFAULT_CART.to_string()
}

fn default_scope() -> String {
    "session".to_string()
}

impl Default for CartPayload {
    fn default() -> Self {
        Self {
            cart: default_cart(),
            scope: default_scope(),
            username: None,
            item: None,
            details: Details::new(),
        }
    }
}

impl CartPayload {
    /// Payload for cart `cart` in `scope`.
    pub fn new(cart: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            cart: cart.into(),
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// Address the cart of `username`.
    pub fn for_user(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the item and its details.
    pub fn with_item(mut self, item: impl Into<String>, details: Details) -> Self {
        self.item = Some(item.into());
        self.details = details;
        self
    }

    /// Request data as seen by the strategies; unknown fields such as
    /// `username` travel in `__extras`.
    pub fn data_dict(&self) -> Value {
        match &self.username {
            Some(username) => json!({ "__extras": { "username": username } }),
            None => json!({}),
        }
    }

    fn required_item(&self) -> Result<&str, CartError> {
        self.item
            .as_deref()
            .ok_or_else(|| CartError::InvalidPayload("missing item".to_string()))
    }
}

fn restored_cart(
    factory: &CartFactory,
    ctx: &mut RequestContext,
    payload: &CartPayload,
) -> Result<Cart, CartError> {
    let mut cart = factory.get_cart(payload.scope.as_str(), ctx, payload.data_dict())?;
    cart.restore(ctx, &payload.cart)?;
    Ok(cart)
}

/// List the items of a cart.
pub fn shopping_cart_show(
    factory: &CartFactory,
    ctx: &mut RequestContext,
    payload: &CartPayload,
) -> Result<Vec<Item>, CartError> {
    Ok(restored_cart(factory, ctx, payload)?.show())
}

/// Add (or replace) an item.
pub fn shopping_cart_add(
    factory: &CartFactory,
    ctx: &mut RequestContext,
    payload: &CartPayload,
) -> Result<Vec<Item>, CartError> {
    let item = payload.required_item()?;
    let mut cart = restored_cart(factory, ctx, payload)?;
    cart.add(item, payload.details.clone());
    cart.save(ctx, &payload.cart)?;
    Ok(cart.show())
}

/// Remove an item. Removing an absent item leaves the cart unchanged.
pub fn shopping_cart_pop(
    factory: &CartFactory,
    ctx: &mut RequestContext,
    payload: &CartPayload,
) -> Result<Vec<Item>, CartError> {
    let item = payload.required_item()?;
    let mut cart = restored_cart(factory, ctx, payload)?;
    if cart.pop(item).is_some() {
        cart.save(ctx, &payload.cart)?;
    }
    Ok(cart.show())
}

/// Drop the whole cart.
pub fn shopping_cart_clear(
    factory: &CartFactory,
    ctx: &mut RequestContext,
    payload: &CartPayload,
) -> Result<Vec<Item>, CartError> {
    let mut cart = factory.get_cart(payload.scope.as_str(), ctx, payload.data_dict())?;
    cart.drop(ctx, &payload.cart)?;
    Ok(cart.show())
}

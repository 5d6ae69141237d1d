//! Session backed carts.

use serde_json::{Map, Value};

use super::CartStorage;
use crate::context::RequestContext;
use crate::error::CartError;
use crate::item::Content;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Platform session, or the request namespace when there is none.
    Platform,
    /// Always the request namespace.
    RequestScoped,
}

/// Carts stored in the session mapping under `shopping_cart:<key>`.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    slot: Slot,
}

impl SessionStorage {
    /// Store in the platform session.
    ///
    /// Requests without a session fall back to the request-scoped
    /// namespace, which lives only as long as the [`RequestContext`].
    pub fn platform() -> Self {
        Self {
            slot: Slot::Platform,
        }
    }

    /// Store in the request-scoped namespace only.
    pub fn request_scoped() -> Self {
        Self {
            slot: Slot::RequestScoped,
        }
    }

    fn data<'c>(&self, ctx: &'c mut RequestContext) -> &'c mut Map<String, Value> {
        ctx.session_data_or_scratch(self.slot == Slot::Platform)
    }
}

fn slot_key(key: &str) -> String {
    format!("shopping_cart:{}", key)
}

impl CartStorage for SessionStorage {
    fn name(&self) -> &'static str {
        match self.slot {
            Slot::Platform => "session",
            Slot::RequestScoped => "request_session",
        }
    }

    fn restore(
        &self,
        ctx: &mut RequestContext,
        _identity: &str,
        key: &str,
    ) -> Result<Content, CartError> {
        super::content_from_value(self.data(ctx).get(&slot_key(key)))
    }

    fn save(
        &self,
        ctx: &mut RequestContext,
        _identity: &str,
        key: &str,
        content: &Content,
    ) -> Result<(), CartError> {
        let value = serde_json::to_value(content)?;
        self.data(ctx).insert(slot_key(key), value);
        Ok(())
    }

    fn discard(
        &self,
        ctx: &mut RequestContext,
        _identity: &str,
        key: &str,
    ) -> Result<(), CartError> {
        self.data(ctx).remove(&slot_key(key));
        Ok(())
    }
}

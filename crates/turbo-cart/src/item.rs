//! Cart items.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form metadata describing an item in the cart (quantity, variant...).
pub type Details = Map<String, Value>;

/// Cart content: item id to its details. Ids are unique.
pub type Content = BTreeMap<String, Details>;

/// One entry of [`Cart::show`](crate::Cart::show).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: String,
    /// Item details.
    #[serde(default)]
    pub details: Details,
}

impl Item {
    /// Create an item record.
    pub fn new(id: impl Into<String>, details: Details) -> Self {
        Self {
            id: id.into(),
            details,
        }
    }
}

//! Catalog item type entity.
//!
//! # Invariants
//! - `price` is a non-negative amount in the minor currency unit.
//! - Many order lines may reference one item type; the reference is
//!   non-owning.

use crate::model::{EntityError, EntityId, UNASSIGNED_ID};
use serde::{Deserialize, Serialize};

/// A catalog entry order lines can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    /// Store-assigned id, `0` until persisted.
    pub id: EntityId,
    pub name: String,
    pub description: String,
    /// Unit price in the minor currency unit (e.g. cents).
    pub price: i64,
}

impl ItemType {
    /// Creates an item type that has not been persisted yet.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: i64,
    ) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            description: description.into(),
            price,
        }
    }

    /// Returns whether the store has assigned an identity to this item type.
    pub fn is_persisted(&self) -> bool {
        self.id > UNASSIGNED_ID
    }

    /// Checks field invariants before the item type reaches persistence.
    pub fn validate(&self) -> Result<(), EntityError> {
        if self.price < 0 {
            return Err(EntityError::NegativePrice { price: self.price });
        }
        Ok(())
    }
}

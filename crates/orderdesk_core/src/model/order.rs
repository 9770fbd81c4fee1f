//! Order and order line entities.
//!
//! # Responsibility
//! - Represent one customer order and the ordered sequence of lines it owns.
//!
//! # Invariants
//! - An order belongs to exactly one persisted customer.
//! - An order exclusively owns its lines; `lines` reflects creation order.
//! - The order total is derived from the lines, never stored.
//!
//! # See also
//! - docs/architecture/data-model.md

use crate::model::{Customer, EntityError, EntityId, ItemType, UNASSIGNED_ID};
use serde::{Deserialize, Serialize};

/// An order placed by one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned id, `0` until persisted.
    pub id: EntityId,
    /// Id of the owning customer.
    pub customer_id: EntityId,
    /// Owned lines in creation order.
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates an empty order owned by the provided customer.
    ///
    /// The customer must already be persisted; the unit of work rejects
    /// orders for unpersisted customers before they reach the session.
    pub fn new(customer: &Customer) -> Self {
        Self {
            id: UNASSIGNED_ID,
            customer_id: customer.id,
            lines: Vec::new(),
        }
    }

    /// Returns whether the store has assigned an identity to this order.
    pub fn is_persisted(&self) -> bool {
        self.id > UNASSIGNED_ID
    }

    /// Appends a line to the owned collection.
    pub fn add_line(&mut self, line: OrderLine) {
        self.lines.push(line);
    }
}

/// A quantity of one catalog item type attached to one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Store-assigned id, `0` until persisted.
    pub id: EntityId,
    /// Id of the owning order.
    pub order_id: EntityId,
    pub quantity: i64,
    /// Snapshot of the referenced item type, reloaded by join on fetch.
    pub item: ItemType,
}

impl OrderLine {
    /// Creates a line that has not been attached to an order yet.
    pub fn new(quantity: i64, item: ItemType) -> Self {
        Self {
            id: UNASSIGNED_ID,
            order_id: UNASSIGNED_ID,
            quantity,
            item,
        }
    }

    /// Returns whether the store has assigned an identity to this line.
    pub fn is_persisted(&self) -> bool {
        self.id > UNASSIGNED_ID
    }

    /// Checks field invariants before the line reaches persistence.
    pub fn validate(&self) -> Result<(), EntityError> {
        if self.quantity < 0 {
            return Err(EntityError::NegativeQuantity {
                quantity: self.quantity,
            });
        }
        if !self.item.is_persisted() {
            return Err(EntityError::NotPersisted { entity: "ItemType" });
        }
        Ok(())
    }
}

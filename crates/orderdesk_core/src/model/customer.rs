//! Customer entity.
//!
//! # Invariants
//! - `id` is unique once assigned and never reused.
//! - The sequence of orders owned by a customer is navigated through the
//!   session's by-customer query, not stored on the entity.

use crate::model::{EntityId, UNASSIGNED_ID};
use serde::{Deserialize, Serialize};

/// A customer able to place orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned id, `0` until persisted.
    pub id: EntityId,
    pub name: String,
    pub email: String,
}

impl Customer {
    /// Creates a customer that has not been persisted yet.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns whether the store has assigned an identity to this customer.
    pub fn is_persisted(&self) -> bool {
        self.id > UNASSIGNED_ID
    }
}

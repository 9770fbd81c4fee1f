//! Order-taking domain model.
//!
//! # Responsibility
//! - Define the customer/order/line/item-type entity graph used by the
//!   unit-of-work layer.
//! - Enforce field-level invariants (`price >= 0`, `quantity >= 0`) before
//!   entities reach persistence.
//!
//! # Invariants
//! - Every entity is identified by a store-assigned positive `i64` id.
//! - `EntityId::UNASSIGNED` (`0`) marks an entity that has not been persisted.
//! - Equality is structural (field-wise) on every entity, so a reloaded
//!   entity compares equal to the instance it was created from.
//!
//! # See also
//! - docs/architecture/data-model.md

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod customer;
pub mod item_type;
pub mod order;

pub use customer::Customer;
pub use item_type::ItemType;
pub use order::{Order, OrderLine};

/// Store-assigned entity identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EntityId = i64;

/// Id value carried by entities that have not been persisted yet.
pub const UNASSIGNED_ID: EntityId = 0;

/// Validation failure raised before an entity reaches persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// An item type was built with a negative price.
    NegativePrice { price: i64 },
    /// An order line was built with a negative quantity.
    NegativeQuantity { quantity: i64 },
    /// A referenced entity has no store-assigned id yet.
    NotPersisted { entity: &'static str },
}

impl Display for EntityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativePrice { price } => {
                write!(f, "item type price must be >= 0, got {price}")
            }
            Self::NegativeQuantity { quantity } => {
                write!(f, "order line quantity must be >= 0, got {quantity}")
            }
            Self::NotPersisted { entity } => {
                write!(f, "{entity} must be persisted before it can be referenced")
            }
        }
    }
}

impl Error for EntityError {}

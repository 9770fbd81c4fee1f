//! Persistence session capability consumed by the unit of work.
//!
//! # Responsibility
//! - Define the transaction-control and typed persist/find/query contract
//!   the unit of work runs its operations against.
//! - Isolate SQL details from transaction orchestration.
//!
//! # Invariants
//! - Insert methods assign the entity's store identity before returning.
//! - `commit`/`rollback` fail only when no transaction is active.
//! - `close` releases the underlying handle exactly once and discards
//!   uncommitted state if a transaction is still open.
//!
//! # See also
//! - docs/architecture/unit-of-work.md

use crate::db::DbError;
use crate::model::{Customer, EntityId, ItemType, Order, OrderLine};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteSession;

pub type SessionResult<T> = Result<T, SessionError>;

/// Storage-side failure surfaced to the unit of work.
#[derive(Debug)]
pub enum SessionError {
    Db(DbError),
    /// A row update targeted an entity the store does not know.
    NotFound { entity: &'static str, id: EntityId },
    /// Persisted state could not be mapped back onto the entity graph.
    InvalidData(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted data: {message}")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SessionError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage capability the unit of work owns.
///
/// One session maps to one underlying connection. Every query of the
/// original order store is a typed method here; there is no symbolic
/// query-by-name dispatch.
pub trait Session {
    /// Opens a transaction. Fails when one is already active.
    fn begin(&mut self) -> SessionResult<()>;

    /// Durably applies everything performed since `begin`.
    fn commit(&mut self) -> SessionResult<()>;

    /// Discards everything performed since `begin`.
    fn rollback(&mut self) -> SessionResult<()>;

    /// Reports whether a transaction is currently open.
    fn is_active(&self) -> bool;

    /// Releases the session handle.
    fn close(self) -> SessionResult<()>
    where
        Self: Sized;

    /// Inserts a customer and assigns its store identity.
    fn insert_customer(&mut self, customer: &mut Customer) -> SessionResult<()>;
    /// Point lookup by identity.
    fn find_customer(&self, id: EntityId) -> SessionResult<Option<Customer>>;
    /// Returns all customers.
    fn customers(&self) -> SessionResult<Vec<Customer>>;

    /// Inserts an item type and assigns its store identity.
    fn insert_item_type(&mut self, item: &mut ItemType) -> SessionResult<()>;
    /// Point lookup by identity.
    fn find_item_type(&self, id: EntityId) -> SessionResult<Option<ItemType>>;
    /// Returns all item types.
    fn item_types(&self) -> SessionResult<Vec<ItemType>>;

    /// Inserts an order and assigns its store identity.
    fn insert_order(&mut self, order: &mut Order) -> SessionResult<()>;
    /// Point lookup by identity, with owned lines loaded in line-id order.
    fn find_order(&self, id: EntityId) -> SessionResult<Option<Order>>;
    /// Returns all orders with their lines loaded.
    fn orders(&self) -> SessionResult<Vec<Order>>;
    /// Returns all orders owned by the provided customer.
    fn orders_for(&self, customer_id: EntityId) -> SessionResult<Vec<Order>>;

    /// Inserts an order line and assigns its store identity.
    fn insert_order_line(&mut self, line: &mut OrderLine) -> SessionResult<()>;
    /// Reconciles an order's row after its owned collection changed.
    fn merge_order(&mut self, order: &Order) -> SessionResult<()>;
}

//! Transactional unit of work over one persistence session.
//!
//! # Responsibility
//! - Own one session and its transaction lifecycle.
//! - Expose the order-domain create/read operations that run inside the
//!   currently open transaction.
//! - Guarantee the transaction reaches a terminal state before the session
//!   is released.
//!
//! # Invariants
//! - State moves `Idle -> Active` on begin, `Active -> Idle` on
//!   commit/rollback, and `* -> Closed` on close; `Closed` is terminal.
//! - Domain operations require an active transaction.
//! - The session is released exactly once, on close; close is idempotent
//!   and also runs from `Drop` so every exit path reaches it.
//!
//! # See also
//! - docs/architecture/unit-of-work.md

use crate::model::{Customer, EntityError, EntityId, ItemType, Order, OrderLine};
use crate::session::{Session, SessionError};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type UowResult<T> = Result<T, UowError>;

/// Failure raised by the unit-of-work layer.
#[derive(Debug)]
pub enum UowError {
    /// `begin` was called while a transaction is already open.
    AlreadyActive,
    /// A domain operation or transaction decision ran without an open
    /// transaction (or after close).
    NoActiveTransaction,
    /// The storage engine rejected a begin/commit/rollback/close.
    Transaction(SessionError),
    /// An entity operation failed inside the session.
    Session(SessionError),
    /// An entity violated a field invariant before persistence.
    Entity(EntityError),
    /// The order total exceeds the representable range.
    ArithmeticOverflow,
    /// A close policy value outside the recognized set reached parsing.
    UnsupportedClosePolicy(String),
}

impl Display for UowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyActive => write!(f, "a transaction is already active"),
            Self::NoActiveTransaction => write!(f, "no transaction is active"),
            Self::Transaction(err) => write!(f, "transaction control failed: {err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Entity(err) => write!(f, "{err}"),
            Self::ArithmeticOverflow => {
                write!(f, "order total exceeds the representable range")
            }
            Self::UnsupportedClosePolicy(value) => {
                write!(f, "unsupported close policy `{value}`; expected commit|rollback")
            }
        }
    }
}

impl Error for UowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transaction(err) | Self::Session(err) => Some(err),
            Self::Entity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for UowError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<EntityError> for UowError {
    fn from(value: EntityError) -> Self {
        Self::Entity(value)
    }
}

/// Decision applied to a still-open transaction when the unit of work is
/// closed without an explicit commit or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    #[default]
    Commit,
    Rollback,
}

impl ClosePolicy {
    /// Parses a configuration value into a close policy.
    ///
    /// Unrecognized values fail loudly instead of defaulting, so a
    /// misconfigured deployment is caught at the boundary.
    pub fn parse(value: &str) -> UowResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "commit" => Ok(Self::Commit),
            "rollback" => Ok(Self::Rollback),
            other => Err(UowError::UnsupportedClosePolicy(other.to_string())),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Rollback => "rollback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UowState {
    Idle,
    Active,
    Closed,
}

/// Transactional unit of work owning one persistence session.
///
/// Not safe for concurrent use; callers serialize access to one instance.
/// Multiple instances may run concurrently, each over its own session.
pub struct UnitOfWork<S: Session> {
    session: Option<S>,
    state: UowState,
    on_close: ClosePolicy,
}

impl<S: Session> UnitOfWork<S> {
    /// Creates a unit of work in explicit mode: the caller controls
    /// begin/commit/rollback/close.
    pub fn new(session: S) -> Self {
        Self {
            session: Some(session),
            state: UowState::Idle,
            on_close: ClosePolicy::default(),
        }
    }

    /// Creates a unit of work whose transaction begins immediately.
    ///
    /// Models the common case where every operation happens inside one
    /// implicit transaction that is decided at close time.
    pub fn begin_new(session: S) -> UowResult<Self> {
        let mut uow = Self::new(session);
        uow.begin()?;
        Ok(uow)
    }

    /// Overrides the decision applied to a still-open transaction at close.
    ///
    /// Has no effect once the unit of work is closed.
    pub fn on_close(&mut self, policy: ClosePolicy) -> &mut Self {
        if self.state != UowState::Closed {
            self.on_close = policy;
        }
        self
    }

    /// Reports whether a transaction is currently open.
    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_active())
    }

    /// Opens the transaction.
    ///
    /// # Errors
    /// - `AlreadyActive` when a transaction is already open; re-entrant
    ///   begin is rejected, not merged.
    /// - `NoActiveTransaction` when the unit of work is closed.
    pub fn begin(&mut self) -> UowResult<()> {
        match self.state {
            UowState::Active => return Err(UowError::AlreadyActive),
            UowState::Closed => return Err(UowError::NoActiveTransaction),
            UowState::Idle => {}
        }

        self.session_mut()?.begin().map_err(UowError::Transaction)?;
        self.state = UowState::Active;
        debug!("event=tx_begin module=uow status=ok");
        Ok(())
    }

    /// Durably applies all operations performed since `begin`.
    ///
    /// On failure the transaction's state is undefined for this unit of
    /// work; callers must treat it as unusable except for `close`.
    pub fn commit(&mut self) -> UowResult<()> {
        self.ensure_active()?;
        self.session_mut()?.commit().map_err(UowError::Transaction)?;
        self.state = UowState::Idle;
        debug!("event=tx_commit module=uow status=ok");
        Ok(())
    }

    /// Discards all operations performed since `begin`.
    pub fn rollback(&mut self) -> UowResult<()> {
        self.ensure_active()?;
        self.session_mut()?.rollback().map_err(UowError::Transaction)?;
        self.state = UowState::Idle;
        debug!("event=tx_rollback module=uow status=ok");
        Ok(())
    }

    /// Releases the session, deciding a still-open transaction through the
    /// configured close policy first.
    ///
    /// Idempotent: closing an already-closed unit of work is a no-op.
    pub fn close(&mut self) -> UowResult<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        self.state = UowState::Closed;

        // The session's own view decides whether the policy applies; after
        // a failed commit the cached state is no longer trustworthy.
        let decision = if session.is_active() {
            match self.on_close {
                ClosePolicy::Commit => session.commit(),
                ClosePolicy::Rollback => session.rollback(),
            }
        } else {
            Ok(())
        };

        let released = session.close();
        debug!(
            "event=uow_close module=uow status={} policy={}",
            if decision.is_ok() && released.is_ok() {
                "ok"
            } else {
                "error"
            },
            self.on_close.as_str()
        );

        decision.map_err(UowError::Transaction)?;
        released.map_err(UowError::Transaction)?;
        Ok(())
    }

    /// Creates a new customer inside the current transaction.
    pub fn create_customer(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> UowResult<Customer> {
        self.ensure_active()?;
        let mut customer = Customer::new(name, email);
        self.session_mut()?.insert_customer(&mut customer)?;
        Ok(customer)
    }

    /// Finds the customer with the provided id.
    pub fn find_customer(&self, id: EntityId) -> UowResult<Option<Customer>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.find_customer(id)?)
    }

    /// Returns the complete list of customers.
    pub fn customers(&self) -> UowResult<Vec<Customer>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.customers()?)
    }

    /// Creates a new empty order owned by the provided customer.
    pub fn create_order(&mut self, customer: &Customer) -> UowResult<Order> {
        self.ensure_active()?;
        if !customer.is_persisted() {
            return Err(UowError::Entity(EntityError::NotPersisted {
                entity: "Customer",
            }));
        }

        let mut order = Order::new(customer);
        self.session_mut()?.insert_order(&mut order)?;
        Ok(order)
    }

    /// Returns the order with the provided id, lines included.
    pub fn find_order(&self, id: EntityId) -> UowResult<Option<Order>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.find_order(id)?)
    }

    /// Returns all orders.
    pub fn orders(&self) -> UowResult<Vec<Order>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.orders()?)
    }

    /// Returns all orders owned by the provided customer.
    pub fn orders_for(&self, customer: &Customer) -> UowResult<Vec<Order>> {
        self.ensure_active()?;
        if !customer.is_persisted() {
            return Err(UowError::Entity(EntityError::NotPersisted {
                entity: "Customer",
            }));
        }

        Ok(self.session_ref()?.orders_for(customer.id)?)
    }

    /// Creates a new order line and appends it to the order's owned
    /// collection.
    ///
    /// Persists the line, then reconciles the order so the stored shape
    /// matches the in-memory one.
    pub fn create_order_line(
        &mut self,
        order: &mut Order,
        quantity: i64,
        item: &ItemType,
    ) -> UowResult<OrderLine> {
        self.ensure_active()?;
        if !order.is_persisted() {
            return Err(UowError::Entity(EntityError::NotPersisted {
                entity: "Order",
            }));
        }

        let mut line = OrderLine::new(quantity, item.clone());
        line.validate()?;
        line.order_id = order.id;

        let session = self.session_mut()?;
        session.insert_order_line(&mut line)?;
        order.add_line(line.clone());
        session.merge_order(order)?;
        Ok(line)
    }

    /// Creates a new catalog item type.
    pub fn create_item_type(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        price: i64,
    ) -> UowResult<ItemType> {
        self.ensure_active()?;
        let mut item = ItemType::new(name, description, price);
        item.validate()?;
        self.session_mut()?.insert_item_type(&mut item)?;
        Ok(item)
    }

    /// Returns the item type with the provided id.
    pub fn find_item_type(&self, id: EntityId) -> UowResult<Option<ItemType>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.find_item_type(id)?)
    }

    /// Returns all item types.
    pub fn item_types(&self) -> UowResult<Vec<ItemType>> {
        self.ensure_active()?;
        Ok(self.session_ref()?.item_types()?)
    }

    /// Returns the total price of the provided order.
    ///
    /// Folds `quantity * item.price` over the lines with overflow-checked
    /// arithmetic; the value represents money, so overflow is reported,
    /// never wrapped.
    pub fn total(&self, order: &Order) -> UowResult<i64> {
        self.ensure_active()?;
        order.lines.iter().try_fold(0i64, |sum, line| {
            line.quantity
                .checked_mul(line.item.price)
                .and_then(|line_total| sum.checked_add(line_total))
                .ok_or(UowError::ArithmeticOverflow)
        })
    }

    fn ensure_active(&self) -> UowResult<()> {
        if self.state == UowState::Active {
            Ok(())
        } else {
            Err(UowError::NoActiveTransaction)
        }
    }

    fn session_ref(&self) -> UowResult<&S> {
        self.session.as_ref().ok_or(UowError::NoActiveTransaction)
    }

    fn session_mut(&mut self) -> UowResult<&mut S> {
        self.session.as_mut().ok_or(UowError::NoActiveTransaction)
    }
}

impl<S: Session> Drop for UnitOfWork<S> {
    fn drop(&mut self) {
        if self.session.is_none() {
            return;
        }
        if let Err(err) = self.close() {
            error!("event=uow_close module=uow status=error error={err}");
        }
    }
}

//! SQLite-backed persistence session.
//!
//! # Responsibility
//! - Implement the `Session` contract over one owned rusqlite connection.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Transactions are driven by explicit `BEGIN IMMEDIATE`/`COMMIT`/
//!   `ROLLBACK`; `is_active` mirrors the connection's autocommit flag.
//! - Loaded orders carry their lines in line-id order, which equals
//!   creation order.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::{Customer, EntityId, ItemType, Order, OrderLine};
use crate::session::{Session, SessionError, SessionResult};
use rusqlite::{params, Connection, Row};
use std::path::Path;

const ORDER_LINE_SELECT_SQL: &str = "SELECT
    l.id,
    l.order_id,
    l.quantity,
    i.id AS item_id,
    i.name,
    i.description,
    i.price
FROM order_lines l
INNER JOIN item_types i ON i.id = l.item_id";

/// Persistence session over one SQLite connection.
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Wraps an already-bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens a file-backed session with migrations applied.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory session with migrations applied.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn load_lines(&self, order_id: EntityId) -> SessionResult<Vec<OrderLine>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORDER_LINE_SELECT_SQL}
             WHERE l.order_id = ?1
             ORDER BY l.id ASC;"
        ))?;

        let mut rows = stmt.query(params![order_id])?;
        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            lines.push(parse_line_row(row)?);
        }

        Ok(lines)
    }

    fn load_orders(&self, sql: &str, bind: &[EntityId]) -> SessionResult<Vec<Order>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind))?;

        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            let id: EntityId = row.get("id")?;
            let customer_id: EntityId = row.get("customer_id")?;
            orders.push(Order {
                id,
                customer_id,
                lines: Vec::new(),
            });
        }

        for order in &mut orders {
            order.lines = self.load_lines(order.id)?;
        }

        Ok(orders)
    }
}

impl Session for SqliteSession {
    fn begin(&mut self) -> SessionResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&mut self) -> SessionResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&mut self) -> SessionResult<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn close(self) -> SessionResult<()> {
        // A still-open transaction is implicitly rolled back by SQLite when
        // the connection goes away.
        self.conn
            .close()
            .map_err(|(_conn, err)| err)?;
        Ok(())
    }

    fn insert_customer(&mut self, customer: &mut Customer) -> SessionResult<()> {
        self.conn.execute(
            "INSERT INTO customers (name, email) VALUES (?1, ?2);",
            params![customer.name.as_str(), customer.email.as_str()],
        )?;
        customer.id = self.conn.last_insert_rowid();
        Ok(())
    }

    fn find_customer(&self, id: EntityId) -> SessionResult<Option<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email
             FROM customers
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn customers(&self) -> SessionResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email
             FROM customers
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }

        Ok(customers)
    }

    fn insert_item_type(&mut self, item: &mut ItemType) -> SessionResult<()> {
        self.conn.execute(
            "INSERT INTO item_types (name, description, price) VALUES (?1, ?2, ?3);",
            params![item.name.as_str(), item.description.as_str(), item.price],
        )?;
        item.id = self.conn.last_insert_rowid();
        Ok(())
    }

    fn find_item_type(&self, id: EntityId) -> SessionResult<Option<ItemType>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, price
             FROM item_types
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_type_row(row)?));
        }

        Ok(None)
    }

    fn item_types(&self) -> SessionResult<Vec<ItemType>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, price
             FROM item_types
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_type_row(row)?);
        }

        Ok(items)
    }

    fn insert_order(&mut self, order: &mut Order) -> SessionResult<()> {
        self.conn.execute(
            "INSERT INTO orders (customer_id) VALUES (?1);",
            params![order.customer_id],
        )?;
        order.id = self.conn.last_insert_rowid();
        Ok(())
    }

    fn find_order(&self, id: EntityId) -> SessionResult<Option<Order>> {
        let mut orders = self.load_orders(
            "SELECT id, customer_id
             FROM orders
             WHERE id = ?1;",
            &[id],
        )?;

        Ok(orders.pop())
    }

    fn orders(&self) -> SessionResult<Vec<Order>> {
        self.load_orders(
            "SELECT id, customer_id
             FROM orders
             ORDER BY id ASC;",
            &[],
        )
    }

    fn orders_for(&self, customer_id: EntityId) -> SessionResult<Vec<Order>> {
        self.load_orders(
            "SELECT id, customer_id
             FROM orders
             WHERE customer_id = ?1
             ORDER BY id ASC;",
            &[customer_id],
        )
    }

    fn insert_order_line(&mut self, line: &mut OrderLine) -> SessionResult<()> {
        self.conn.execute(
            "INSERT INTO order_lines (order_id, item_id, quantity) VALUES (?1, ?2, ?3);",
            params![line.order_id, line.item.id, line.quantity],
        )?;
        line.id = self.conn.last_insert_rowid();
        Ok(())
    }

    fn merge_order(&mut self, order: &Order) -> SessionResult<()> {
        let changed = self.conn.execute(
            "UPDATE orders
             SET customer_id = ?2
             WHERE id = ?1;",
            params![order.id, order.customer_id],
        )?;

        if changed == 0 {
            return Err(SessionError::NotFound {
                entity: "Order",
                id: order.id,
            });
        }

        Ok(())
    }
}

fn parse_customer_row(row: &Row<'_>) -> SessionResult<Customer> {
    Ok(Customer {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    })
}

fn parse_item_type_row(row: &Row<'_>) -> SessionResult<ItemType> {
    Ok(ItemType {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
    })
}

fn parse_line_row(row: &Row<'_>) -> SessionResult<OrderLine> {
    Ok(OrderLine {
        id: row.get("id")?,
        order_id: row.get("order_id")?,
        quantity: row.get("quantity")?,
        item: ItemType {
            id: row.get("item_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
        },
    })
}

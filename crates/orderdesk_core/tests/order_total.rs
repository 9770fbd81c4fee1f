use orderdesk_core::{ItemType, Order, OrderLine, SqliteSession, UnitOfWork, UowError};

#[test]
fn total_sums_quantity_times_price_over_lines() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let customer = uow.create_customer("Ada", "ada@example.com").unwrap();
    let mut order = uow.create_order(&customer).unwrap();
    let coffee = uow.create_item_type("Coffee", "whole beans", 100).unwrap();
    let tea = uow.create_item_type("Tea", "loose leaf", 50).unwrap();

    uow.create_order_line(&mut order, 2, &coffee).unwrap();
    uow.create_order_line(&mut order, 3, &tea).unwrap();

    assert_eq!(uow.total(&order).unwrap(), 350);
}

#[test]
fn total_of_an_empty_order_is_zero() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let customer = uow.create_customer("Ada", "ada@example.com").unwrap();
    let order = uow.create_order(&customer).unwrap();

    assert_eq!(uow.total(&order).unwrap(), 0);
}

#[test]
fn total_reports_multiplication_overflow() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let order = order_with_lines(vec![line(1, 2, i64::MAX)]);
    let err = uow.total(&order).unwrap_err();
    assert!(matches!(err, UowError::ArithmeticOverflow));
}

#[test]
fn total_reports_addition_overflow() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let order = order_with_lines(vec![line(1, 1, i64::MAX), line(2, 1, 1)]);
    let err = uow.total(&order).unwrap_err();
    assert!(matches!(err, UowError::ArithmeticOverflow));
}

#[test]
fn total_requires_an_active_transaction() {
    let uow = memory_uow();

    let order = order_with_lines(Vec::new());
    let err = uow.total(&order).unwrap_err();
    assert!(matches!(err, UowError::NoActiveTransaction));
}

fn order_with_lines(lines: Vec<OrderLine>) -> Order {
    Order {
        id: 1,
        customer_id: 1,
        lines,
    }
}

fn line(id: i64, quantity: i64, price: i64) -> OrderLine {
    OrderLine {
        id,
        order_id: 1,
        quantity,
        item: ItemType {
            id,
            name: format!("item-{id}"),
            description: String::new(),
            price,
        },
    }
}

fn memory_uow() -> UnitOfWork<SqliteSession> {
    UnitOfWork::new(SqliteSession::open_in_memory().unwrap())
}

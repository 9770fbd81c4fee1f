use orderdesk_core::{Customer, EntityError, ItemType, Order, OrderLine};

#[test]
fn new_entities_start_unpersisted() {
    let customer = Customer::new("Ada", "ada@example.com");
    assert_eq!(customer.id, 0);
    assert!(!customer.is_persisted());

    let item = ItemType::new("Coffee", "whole beans", 1250);
    assert_eq!(item.id, 0);
    assert!(!item.is_persisted());

    let order = Order::new(&customer);
    assert_eq!(order.id, 0);
    assert_eq!(order.customer_id, customer.id);
    assert!(order.lines.is_empty());
    assert!(!order.is_persisted());

    let line = OrderLine::new(2, item);
    assert_eq!(line.id, 0);
    assert_eq!(line.order_id, 0);
    assert!(!line.is_persisted());
}

#[test]
fn item_type_validate_rejects_negative_price() {
    let item = ItemType::new("Bad", "negative", -5);
    assert_eq!(
        item.validate().unwrap_err(),
        EntityError::NegativePrice { price: -5 }
    );
}

#[test]
fn order_line_validate_rejects_negative_quantity() {
    let mut item = ItemType::new("Coffee", "whole beans", 1250);
    item.id = 1;

    let line = OrderLine::new(-1, item);
    assert_eq!(
        line.validate().unwrap_err(),
        EntityError::NegativeQuantity { quantity: -1 }
    );
}

#[test]
fn order_line_validate_rejects_unpersisted_item() {
    let line = OrderLine::new(1, ItemType::new("Phantom", "unpersisted", 100));
    assert_eq!(
        line.validate().unwrap_err(),
        EntityError::NotPersisted { entity: "ItemType" }
    );
}

#[test]
fn zero_quantity_and_zero_price_are_valid() {
    let mut item = ItemType::new("Free", "giveaway", 0);
    assert!(item.validate().is_ok());
    item.id = 1;

    let line = OrderLine::new(0, item);
    assert!(line.validate().is_ok());
}

#[test]
fn equality_is_structural() {
    let mut first = Customer::new("Ada", "ada@example.com");
    let mut second = Customer::new("Ada", "ada@example.com");
    assert_eq!(first, second);

    first.id = 1;
    assert_ne!(first, second);
    second.id = 1;
    assert_eq!(first, second);
}

#[test]
fn order_serialization_uses_expected_wire_fields() {
    let mut customer = Customer::new("Ada", "ada@example.com");
    customer.id = 7;

    let mut item = ItemType::new("Coffee", "whole beans", 1250);
    item.id = 3;

    let mut order = Order::new(&customer);
    order.id = 11;
    let mut line = OrderLine::new(2, item);
    line.id = 21;
    line.order_id = order.id;
    order.add_line(line);

    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json["id"], 11);
    assert_eq!(json["customer_id"], 7);
    assert_eq!(json["lines"][0]["id"], 21);
    assert_eq!(json["lines"][0]["order_id"], 11);
    assert_eq!(json["lines"][0]["quantity"], 2);
    assert_eq!(json["lines"][0]["item"]["id"], 3);
    assert_eq!(json["lines"][0]["item"]["price"], 1250);

    let decoded: Order = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, order);
}

use orderdesk_core::{SqliteSession, UnitOfWork};

#[test]
fn create_customer_assigns_unique_positive_ids() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let first = uow.create_customer("Ada", "ada@example.com").unwrap();
    let second = uow.create_customer("Brian", "brian@example.com").unwrap();

    assert!(first.id > 0);
    assert!(second.id > 0);
    assert_ne!(first.id, second.id);
    assert_eq!(first.name, "Ada");
    assert_eq!(first.email, "ada@example.com");
}

#[test]
fn create_and_find_roundtrip_in_same_transaction() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let customer = uow.create_customer("Ada", "ada@example.com").unwrap();
    let found = uow.find_customer(customer.id).unwrap().unwrap();

    assert_eq!(found, customer);
}

#[test]
fn committed_customer_survives_into_a_fresh_unit_of_work() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orderdesk.db");

    let mut uow = UnitOfWork::new(SqliteSession::open(&path).unwrap());
    uow.begin().unwrap();
    let customer = uow.create_customer("Ada", "ada@example.com").unwrap();
    uow.commit().unwrap();
    uow.close().unwrap();

    let fresh = UnitOfWork::begin_new(SqliteSession::open(&path).unwrap()).unwrap();
    let found = fresh.find_customer(customer.id).unwrap().unwrap();
    assert_eq!(found, customer);
}

#[test]
fn find_missing_customer_returns_none() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    assert_eq!(uow.find_customer(34546).unwrap(), None);
}

#[test]
fn customers_returns_all_created_customers() {
    let mut uow = memory_uow();
    uow.begin().unwrap();

    let created = vec![
        uow.create_customer("Ada", "ada@example.com").unwrap(),
        uow.create_customer("Brian", "brian@example.com").unwrap(),
        uow.create_customer("Grace", "grace@example.com").unwrap(),
    ];

    assert_eq!(uow.customers().unwrap(), created);
}

fn memory_uow() -> UnitOfWork<SqliteSession> {
    UnitOfWork::new(SqliteSession::open_in_memory().unwrap())
}

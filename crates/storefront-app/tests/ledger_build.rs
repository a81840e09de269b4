use storefront_repo::{build_ledger, Ledger};
use storefront_types::domain::cart::{Cart, LineItem};
use storefront_types::domain::order::Order;
use storefront_types::ports::order_ledger::OrderLedger;

#[cfg(feature = "memory")]
#[tokio::test]
async fn builds_session_ledger_without_url() {
    let ledger: Ledger = build_ledger(None).await.expect("build ledger");
    assert!(ledger.list().await.expect("list").is_empty());

    let cart = Cart::new().add_to_cart(LineItem::new("knob-1", "Knob", 4_500, 2));
    let order = Order::snapshot(&cart, chrono::Utc::now()).unwrap();
    let stored = ledger.append(order.clone()).await.unwrap();
    assert_eq!(stored, order);
    assert_eq!(ledger.len().await.unwrap(), 1);
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn builds_sqlite_ledger_from_url() {
    // Use a temp DB path for isolation.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("orders-test.db");
    let url = format!("sqlite://{}", db_path.display());

    let ledger: Ledger = build_ledger(Some(&url)).await.expect("build ledger");
    assert!(ledger.list().await.expect("list").is_empty());
}

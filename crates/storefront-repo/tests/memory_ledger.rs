#![cfg(feature = "memory")]

use chrono::Utc;
use storefront_repo::memory::InMemoryLedger;
use storefront_types::domain::cart::{Cart, LineItem};
use storefront_types::domain::order::{Order, OrderStatus};
use storefront_types::ports::order_ledger::{LedgerError, OrderLedger};

fn order_for(id: &str, qty: u32) -> Order {
    let cart = Cart::new().add_to_cart(LineItem::new(id, "Widget", 500, qty));
    Order::snapshot(&cart, Utc::now()).unwrap()
}

#[tokio::test]
async fn memory_ledger_append_get_list() {
    let ledger = InMemoryLedger::new();
    let first = ledger.append(order_for("hinge-1", 2)).await.unwrap();
    let second = ledger.append(order_for("slide-1", 1)).await.unwrap();

    let fetched = ledger.get(first.id()).await.unwrap().unwrap();
    assert_eq!(fetched.total_paise(), 1000);

    let listed = ledger.list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), second.id());
    assert_eq!(listed[1].id(), first.id());
    assert_eq!(ledger.len().await.unwrap(), 2);
}

#[tokio::test]
async fn memory_ledger_rejects_duplicate_ids() {
    let ledger = InMemoryLedger::new();
    let order = order_for("hinge-1", 1);
    ledger.append(order.clone()).await.unwrap();
    let err = ledger.append(order).await.unwrap_err();
    assert!(matches!(err, LedgerError::Duplicate(_)));
    assert_eq!(ledger.len().await.unwrap(), 1);
}

#[tokio::test]
async fn memory_ledger_status_moves_forward_only() {
    let ledger = InMemoryLedger::new();
    let order = ledger.append(order_for("hinge-1", 1)).await.unwrap();

    let updated = ledger
        .advance_status(order.id(), OrderStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status(), OrderStatus::Confirmed);
    assert_eq!(updated.items(), order.items());

    let err = ledger
        .advance_status(order.id(), OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rejected(_)));
}

#[tokio::test]
async fn memory_ledger_handles_missing_rows() {
    let ledger = InMemoryLedger::new();
    assert!(ledger.get("MOD-0-missing").await.unwrap().is_none());
    let updated = ledger
        .advance_status("MOD-0-missing", OrderStatus::Dispatched)
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(ledger.list().await.unwrap().is_empty());
}

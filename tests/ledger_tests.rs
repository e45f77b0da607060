mod common;

use canteen_checkout::domain::codec;
use canteen_checkout::domain::order::{OrderSubmission, PaymentReference};
use canteen_checkout::domain::ports::OrderLedger;
use canteen_checkout::error::CheckoutError;
use canteen_checkout::infrastructure::in_memory::InMemoryLedger;
use chrono::Utc;
use common::{night_canteen_draft, sample_draft};

fn order(reference: &str) -> OrderSubmission {
    OrderSubmission::finalize(
        sample_draft(),
        PaymentReference::new(reference).unwrap(),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_list_returns_insertion_order() {
    let ledger = InMemoryLedger::new();
    ledger.save(order("pay_1")).await.unwrap();
    ledger
        .save(OrderSubmission::finalize(
            night_canteen_draft(),
            PaymentReference::new("pay_2").unwrap(),
            Utc::now(),
        ))
        .await
        .unwrap();
    ledger.save(order("pay_3")).await.unwrap();

    let orders = ledger.list().await.unwrap();
    let references: Vec<&str> = orders
        .iter()
        .map(|o| o.payment_reference.as_str())
        .collect();
    assert_eq!(references, ["pay_1", "pay_2", "pay_3"]);
    assert_eq!(orders[1].canteen_name, "Night Canteen");
}

#[tokio::test]
async fn test_no_entry_is_silently_overwritten() {
    let ledger = InMemoryLedger::new();
    ledger.save(order("pay_1")).await.unwrap();

    // Same settlement reference, different draft: still rejected.
    let conflicting = OrderSubmission::finalize(
        night_canteen_draft(),
        PaymentReference::new("pay_1").unwrap(),
        Utc::now(),
    );
    assert!(matches!(
        ledger.save(conflicting).await,
        Err(CheckoutError::DuplicatePaymentReference(_))
    ));

    let orders = ledger.list().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].canteen_name, "Main Canteen");
}

#[tokio::test]
async fn test_clear_all_then_list_is_empty() {
    let ledger = InMemoryLedger::new();
    for reference in ["pay_1", "pay_2", "pay_3"] {
        ledger.save(order(reference)).await.unwrap();
    }

    assert_eq!(ledger.clear_all().await.unwrap(), 3);
    assert!(ledger.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_orders_round_trip_through_codec() {
    let ledger = InMemoryLedger::new();
    let original = order("pay_rt");
    ledger.save(original.clone()).await.unwrap();

    let listed = &ledger.list().await.unwrap()[0];
    let decoded = codec::decode(&codec::encode(listed).unwrap()).unwrap();
    assert_eq!(&decoded, listed);
    assert_eq!(decoded, original);
}

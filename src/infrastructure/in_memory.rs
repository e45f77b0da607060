use crate::domain::order::OrderSubmission;
use crate::domain::ports::OrderLedger;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A thread-safe in-memory pending-order ledger.
///
/// Uses `Arc<RwLock<Vec<OrderSubmission>>>` to allow shared concurrent
/// access while preserving insertion order. Serves as the test double for
/// the persistent ledger and as the fallback when persistence is not
/// compiled in.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    orders: Arc<RwLock<Vec<OrderSubmission>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderLedger for InMemoryLedger {
    async fn save(&self, order: OrderSubmission) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|existing| existing.payment_reference == order.payment_reference)
        {
            return Err(CheckoutError::DuplicatePaymentReference(
                order.payment_reference,
            ));
        }
        orders.push(order);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<OrderSubmission>> {
        Ok(self.orders.read().await.clone())
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut orders = self.orders.write().await;
        let cleared = orders.len();
        orders.clear();
        info!(cleared, "cleared the pending-order ledger");
        Ok(cleared)
    }
}

use async_trait::async_trait;
use canteen_checkout::domain::order::{Amount, LineItem, OrderDraft, OrderSubmission};
use canteen_checkout::domain::ports::{OrderLedger, PresentationSurface};
use canteen_checkout::error::{CheckoutError, Result};
use canteen_checkout::infrastructure::in_memory::InMemoryLedger;
use rust_decimal_macros::dec;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn sample_draft() -> OrderDraft {
    let items = vec![
        LineItem::new("Masala Dosa", 2, Amount::new(dec!(90.00)).unwrap()).unwrap(),
        LineItem::new("Filter Coffee", 1, Amount::new(dec!(25.00)).unwrap()).unwrap(),
    ];
    OrderDraft::new("Main Canteen", items, Amount::new(dec!(115.00)).unwrap()).unwrap()
}

pub fn night_canteen_draft() -> OrderDraft {
    let items = vec![LineItem::new("Maggi", 1, Amount::new(dec!(35.00)).unwrap()).unwrap()];
    OrderDraft::new("Night Canteen", items, Amount::new(dec!(35.00)).unwrap()).unwrap()
}

/// Counts dismiss signals so tests can assert the exactly-once contract.
/// `Clone` shares the counter.
#[derive(Default, Clone)]
pub struct RecordingSurface {
    dismissals: Arc<AtomicUsize>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismissals(&self) -> usize {
        self.dismissals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PresentationSurface for RecordingSurface {
    async fn dismiss_checkout(&self) {
        self.dismissals.fetch_add(1, Ordering::SeqCst);
    }
}

/// An in-memory ledger whose first `failures` saves fail with a storage
/// error, for exercising the reconciler's retry path.
#[derive(Clone)]
pub struct FlakyLedger {
    inner: InMemoryLedger,
    failures_left: Arc<AtomicUsize>,
}

impl FlakyLedger {
    pub fn failing(failures: usize) -> Self {
        Self {
            inner: InMemoryLedger::new(),
            failures_left: Arc::new(AtomicUsize::new(failures)),
        }
    }
}

#[async_trait]
impl OrderLedger for FlakyLedger {
    async fn save(&self, order: OrderSubmission) -> Result<()> {
        if self.failures_left.load(Ordering::SeqCst) > 0 {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
            return Err(CheckoutError::Storage(Box::new(std::io::Error::other(
                "simulated storage failure",
            ))));
        }
        self.inner.save(order).await
    }

    async fn list(&self) -> Result<Vec<OrderSubmission>> {
        self.inner.list().await
    }

    async fn clear_all(&self) -> Result<usize> {
        self.inner.clear_all().await
    }
}

pub fn write_events_csv(path: &Path, rows: &[[&str; 4]]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["event", "canteen", "items", "url"])?;
    for row in rows {
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}

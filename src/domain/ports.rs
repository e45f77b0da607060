use crate::domain::order::OrderSubmission;
use crate::error::Result;
use async_trait::async_trait;

/// Durable store of paid-but-unconfirmed order submissions.
///
/// Implementations own the underlying storage exclusively; nothing else
/// mutates it. The ledger preserves insertion order, and callers await each
/// operation to completion, so no partial write is ever observable.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Appends `order` to the ledger. Fails with `DuplicatePaymentReference`
    /// when an entry with the same settlement id already exists; nothing is
    /// ever silently overwritten.
    async fn save(&self, order: OrderSubmission) -> Result<()>;

    /// Returns the full ledger in insertion order. Side-effect-free.
    async fn list(&self) -> Result<Vec<OrderSubmission>>;

    /// Removes every entry (user-initiated, irreversible) and returns how
    /// many were cleared.
    async fn clear_all(&self) -> Result<usize>;
}

pub type OrderLedgerBox = Box<dyn OrderLedger>;

/// Owns dismissing the hosted checkout view once a terminal payment outcome
/// has been reconciled. The UI layer implements this; the reconciler signals
/// it exactly once per consumed session.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    async fn dismiss_checkout(&self);
}

pub type PresentationSurfaceBox = Box<dyn PresentationSurface>;

use crate::application::registry::CheckoutSessionRegistry;
use crate::domain::order::OrderSubmission;
use crate::domain::ports::{OrderLedger, OrderLedgerBox, PresentationSurfaceBox};
use crate::domain::session::SessionId;
use crate::error::CheckoutError;
use crate::interfaces::callback::{self, CallbackOutcome};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Why a callback was ignored without touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Scheme or host does not match the payment-callback contract; the URL
    /// belongs to some other deep link.
    ForeignUrl,
    /// Matched the contract but required parameters were missing or invalid.
    MalformedCallback,
    /// No active session matches the correlation id (stale, duplicate, or
    /// already reconciled).
    SessionNotFound,
}

/// Terminal result of reconciling one inbound callback URL.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The order is in the ledger (or already was, for a replayed
    /// settlement reference).
    Completed(OrderSubmission),
    /// The payment succeeded but the ledger rejected the write twice. The
    /// caller must surface this to the user; money has already moved.
    CompletedUnsaved {
        order: OrderSubmission,
        error: CheckoutError,
    },
    /// The provider reported a failed payment; the draft was discarded.
    Declined { session_id: SessionId },
    /// Not this subsystem's event, or a stale/duplicate delivery. Nothing
    /// was mutated.
    Ignored(IgnoreReason),
}

/// Matches inbound payment callbacks to their originating checkout session
/// and commits the result exactly once.
///
/// The OS can deliver the redirect to either of two app entry points; both
/// must hand their raw URL to `handle_callback` so the two paths cannot
/// drift in behavior. Everything short of a post-payment storage failure is
/// absorbed here.
pub struct DeepLinkReconciler {
    registry: Arc<CheckoutSessionRegistry>,
    ledger: OrderLedgerBox,
    surface: PresentationSurfaceBox,
}

impl DeepLinkReconciler {
    pub fn new(
        registry: Arc<CheckoutSessionRegistry>,
        ledger: OrderLedgerBox,
        surface: PresentationSurfaceBox,
    ) -> Self {
        Self {
            registry,
            ledger,
            surface,
        }
    }

    pub fn ledger(&self) -> &dyn OrderLedger {
        self.ledger.as_ref()
    }

    /// Reconciles one inbound callback URL.
    ///
    /// Foreign URLs, malformed callbacks, and callbacks without a matching
    /// session are ignored without side effects. A matching callback
    /// consumes the session, finalizes the draft on success, persists it
    /// (retrying a failed save once), and signals the presentation surface
    /// to dismiss the hosted checkout exactly once.
    pub async fn handle_callback(&self, raw_url: &str) -> ReconcileOutcome {
        let callback = match callback::parse_callback(raw_url) {
            Ok(Some(callback)) => callback,
            Ok(None) => return ReconcileOutcome::Ignored(IgnoreReason::ForeignUrl),
            Err(err) => {
                warn!(%err, "ignoring malformed payment callback");
                return ReconcileOutcome::Ignored(IgnoreReason::MalformedCallback);
            }
        };

        let session = match self.registry.consume(callback.session_id).await {
            Ok(session) => session,
            Err(_) => {
                info!(
                    session_id = %callback.session_id,
                    "callback does not match the active session; ignoring"
                );
                return ReconcileOutcome::Ignored(IgnoreReason::SessionNotFound);
            }
        };

        let outcome = match callback.outcome {
            CallbackOutcome::Failure => {
                info!(session_id = %session.session_id, "payment declined; discarding draft");
                ReconcileOutcome::Declined {
                    session_id: session.session_id,
                }
            }
            CallbackOutcome::Success { payment_reference } => {
                let order =
                    OrderSubmission::finalize(session.draft, payment_reference, Utc::now());
                self.persist(order).await
            }
        };

        self.surface.dismiss_checkout().await;
        outcome
    }

    /// Saves a finalized order, retrying a failed write at most once. A
    /// duplicate settlement reference means the ledger already holds this
    /// payment, so the save collapses into a no-op success.
    async fn persist(&self, order: OrderSubmission) -> ReconcileOutcome {
        match self.ledger.save(order.clone()).await {
            Ok(()) => ReconcileOutcome::Completed(order),
            Err(CheckoutError::DuplicatePaymentReference(reference)) => {
                info!(%reference, "payment already recorded; save is a no-op");
                ReconcileOutcome::Completed(order)
            }
            Err(first) => {
                warn!(%first, "ledger save failed; retrying once");
                match self.ledger.save(order.clone()).await {
                    Ok(()) => ReconcileOutcome::Completed(order),
                    Err(CheckoutError::DuplicatePaymentReference(reference)) => {
                        info!(%reference, "payment already recorded; save is a no-op");
                        ReconcileOutcome::Completed(order)
                    }
                    Err(err) => {
                        error!(
                            %err,
                            reference = %order.payment_reference,
                            "payment succeeded but the order could not be saved"
                        );
                        ReconcileOutcome::CompletedUnsaved { order, error: err }
                    }
                }
            }
        }
    }
}

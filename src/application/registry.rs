use crate::domain::order::OrderDraft;
use crate::domain::session::{CheckoutSession, SessionId};
use crate::error::{CheckoutError, Result};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Tracks the single currently-outstanding checkout session while the
/// external payment page is open.
///
/// At most one session is live at a time: `begin` replaces and invalidates
/// any predecessor, and `consume` is the one atomic take-if-matching guard
/// that keeps a duplicate or delayed callback from reconciling twice. Both
/// OS delivery paths race through `consume`, so it is serialized against
/// `begin` and against itself.
pub struct CheckoutSessionRegistry {
    active: Mutex<Option<CheckoutSession>>,
}

impl CheckoutSessionRegistry {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Opens a session for `draft` and returns the correlation id handed to
    /// the external checkout surface.
    ///
    /// A session still outstanding at this point is invalidated: its late
    /// callback will resolve `SessionNotFound` instead of touching the new
    /// session's state.
    pub async fn begin(&self, draft: OrderDraft) -> SessionId {
        let session = CheckoutSession::new(draft);
        let session_id = session.session_id;
        let mut active = self.active.lock().await;
        if let Some(previous) = active.replace(session) {
            warn!(
                invalidated = %previous.session_id,
                "replacing an outstanding checkout session"
            );
        }
        session_id
    }

    pub async fn active_session(&self) -> Option<CheckoutSession> {
        self.active.lock().await.clone()
    }

    /// Atomically removes and returns the active session if `session_id`
    /// matches it. A stale, duplicate, or unknown id fails with
    /// `SessionNotFound` and leaves the registry untouched.
    pub async fn consume(&self, session_id: SessionId) -> Result<CheckoutSession> {
        let mut active = self.active.lock().await;
        if active
            .as_ref()
            .is_some_and(|session| session.session_id == session_id)
        {
            if let Some(session) = active.take() {
                return Ok(session);
            }
        }
        debug!(%session_id, "consume attempted for an unknown or stale session");
        Err(CheckoutError::SessionNotFound(session_id))
    }
}

impl Default for CheckoutSessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

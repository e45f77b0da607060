use crate::domain::order::OrderDraft;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The correlation id round-tripped through the hosted checkout surface to
/// link a callback back to its originating session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The ephemeral record correlating an in-app order draft with an external
/// payment attempt before an outcome is known.
///
/// Lives only in memory: if the process dies before the callback arrives,
/// the session is gone and the eventual callback finds no match.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub session_id: SessionId,
    pub draft: OrderDraft,
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(draft: OrderDraft) -> Self {
        Self {
            session_id: SessionId::generate(),
            draft,
            created_at: Utc::now(),
        }
    }
}

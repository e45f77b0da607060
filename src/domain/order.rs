use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a non-negative currency amount.
///
/// This is a wrapper around `rust_decimal::Decimal` that normalizes every
/// value to exactly two decimal places at construction, so that amounts
/// compare and serialize identically no matter how they were written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() {
            return Err(CheckoutError::Validation(
                "amount must not be negative".to_string(),
            ));
        }
        let mut normalized = value.round_dp(2);
        normalized.rescale(2);
        Ok(Self(normalized))
    }

    pub fn zero() -> Self {
        Self(Decimal::new(0, 2))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The payment provider's opaque settlement identifier, unique per
/// successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "payment reference must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single line of an order: what was bought, how many, and the line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub total_price: Amount,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, total_price: Amount) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "line item name must not be empty".to_string(),
            ));
        }
        if quantity == 0 {
            return Err(CheckoutError::Validation(
                "line item quantity must be positive".to_string(),
            ));
        }
        Ok(Self {
            name,
            quantity,
            total_price,
        })
    }
}

/// The order-to-be while the hosted checkout surface is open: no payment
/// reference yet, and never persisted.
///
/// The total-equals-sum-of-lines invariant is checked here, at creation,
/// and carried over unchanged into the eventual `OrderSubmission`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub canteen_name: String,
    pub items: Vec<LineItem>,
    pub total_amount: Amount,
}

impl OrderDraft {
    pub fn new(
        canteen_name: impl Into<String>,
        items: Vec<LineItem>,
        total_amount: Amount,
    ) -> Result<Self> {
        let canteen_name = canteen_name.into();
        if canteen_name.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "canteen name must not be empty".to_string(),
            ));
        }
        let line_sum: Decimal = items.iter().map(|item| item.total_price.value()).sum();
        if total_amount.value() != line_sum {
            return Err(CheckoutError::Validation(format!(
                "total amount {} does not equal the sum of line totals {}",
                total_amount.value(),
                line_sum
            )));
        }
        Ok(Self {
            canteen_name,
            items,
            total_amount,
        })
    }
}

/// A paid-but-unconfirmed order awaiting backend sync or admin review.
///
/// Only ever constructed once a payment outcome is known to be successful;
/// `finalize` is the single way a draft becomes a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub canteen_name: String,
    pub items: Vec<LineItem>,
    pub total_amount: Amount,
    pub payment_reference: PaymentReference,
    pub payment_completed_at: DateTime<Utc>,
    /// Total units across all lines (the sum of quantities, not the number
    /// of distinct lines).
    pub item_count: u32,
}

impl OrderSubmission {
    /// Builds a submission from a consumed draft once the provider has
    /// confirmed the payment. The draft's invariants were checked when it
    /// was created, so this cannot fail.
    pub fn finalize(
        draft: OrderDraft,
        payment_reference: PaymentReference,
        payment_completed_at: DateTime<Utc>,
    ) -> Self {
        let item_count = draft.items.iter().map(|item| item.quantity).sum();
        Self {
            canteen_name: draft.canteen_name,
            items: draft.items,
            total_amount: draft.total_amount,
            payment_reference,
            payment_completed_at,
            item_count,
        }
    }

    /// Re-checks every construction invariant. Decoded submissions must pass
    /// through this before they are trusted.
    pub fn validate(&self) -> Result<()> {
        if self.canteen_name.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "canteen name must not be empty".to_string(),
            ));
        }
        if self.payment_reference.as_str().trim().is_empty() {
            return Err(CheckoutError::Validation(
                "payment reference must not be empty".to_string(),
            ));
        }
        for item in &self.items {
            if item.name.trim().is_empty() {
                return Err(CheckoutError::Validation(
                    "line item name must not be empty".to_string(),
                ));
            }
            if item.quantity == 0 {
                return Err(CheckoutError::Validation(
                    "line item quantity must be positive".to_string(),
                ));
            }
        }
        let line_sum: Decimal = self.items.iter().map(|item| item.total_price.value()).sum();
        if self.total_amount.value() != line_sum {
            return Err(CheckoutError::Validation(format!(
                "total amount {} does not equal the sum of line totals {}",
                self.total_amount.value(),
                line_sum
            )));
        }
        let quantity_sum: u32 = self.items.iter().map(|item| item.quantity).sum();
        if self.item_count != quantity_sum {
            return Err(CheckoutError::Validation(format!(
                "item count {} does not equal the sum of quantities {}",
                self.item_count, quantity_sum
            )));
        }
        Ok(())
    }
}

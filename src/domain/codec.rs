//! Canonical text form of an order submission.
//!
//! The same encoding backs the persisted ledger entries and the payload sent
//! to the order-recording endpoint, so it has to be deterministic and
//! lossless: fields serialize in declaration order, amounts always carry two
//! decimal places, and timestamps are RFC 3339. `decode` re-checks the
//! construction invariants before handing the submission back.

use crate::domain::order::OrderSubmission;
use crate::error::{CheckoutError, Result};

pub fn encode(order: &OrderSubmission) -> Result<String> {
    serde_json::to_string(order).map_err(|err| CheckoutError::Encode(err.to_string()))
}

pub fn decode(text: &str) -> Result<OrderSubmission> {
    let order: OrderSubmission =
        serde_json::from_str(text).map_err(|err| CheckoutError::Decode(err.to_string()))?;
    if let Err(err) = order.validate() {
        return Err(CheckoutError::Decode(err.to_string()));
    }
    Ok(order)
}

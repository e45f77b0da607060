use crate::domain::order::{Amount, LineItem, OrderDraft};
use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Begin,
    Callback,
    Clear,
}

/// One row of a checkout replay script: `begin` opens a session for a draft,
/// `callback` delivers an inbound URL, `clear` wipes the ledger.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutEvent {
    pub event: EventKind,
    #[serde(default)]
    pub canteen: Option<String>,
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl CheckoutEvent {
    /// Builds the order draft described by a `begin` row.
    ///
    /// Items use the `Name xQTY @TOTAL` form separated by `|`, e.g.
    /// `Masala Dosa x2 @90.00|Filter Coffee x1 @25.00`. The draft total is
    /// the sum of the line totals.
    pub fn draft(&self) -> Result<OrderDraft> {
        let canteen = self
            .canteen
            .as_deref()
            .filter(|canteen| !canteen.trim().is_empty())
            .ok_or_else(|| {
                CheckoutError::Validation("begin row is missing the canteen name".to_string())
            })?;

        let raw_items = self.items.as_deref().unwrap_or_default();
        let mut items = Vec::new();
        for entry in raw_items.split('|').filter(|entry| !entry.trim().is_empty()) {
            items.push(parse_line_item(entry)?);
        }

        let total: Decimal = items.iter().map(|item| item.total_price.value()).sum();
        OrderDraft::new(canteen, items, Amount::new(total)?)
    }
}

fn parse_line_item(entry: &str) -> Result<LineItem> {
    let entry = entry.trim();
    let (rest, total) = entry.rsplit_once(" @").ok_or_else(|| invalid(entry))?;
    let (name, quantity) = rest.rsplit_once(" x").ok_or_else(|| invalid(entry))?;
    let quantity: u32 = quantity.trim().parse().map_err(|_| invalid(entry))?;
    let total = Decimal::from_str(total.trim()).map_err(|_| invalid(entry))?;
    LineItem::new(name.trim(), quantity, Amount::new(total)?)
}

fn invalid(entry: &str) -> CheckoutError {
    CheckoutError::Validation(format!(
        "invalid line item '{entry}', expected 'Name xQTY @TOTAL'"
    ))
}

/// Reads checkout replay events from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<CheckoutEvent>`,
/// handling whitespace trimming and flexible record lengths automatically.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes events.
    pub fn events(self) -> impl Iterator<Item = Result<CheckoutEvent>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}

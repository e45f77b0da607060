use crate::domain::order::OrderSubmission;
use crate::error::Result;
use std::io::Write;

/// Writes the pending-order ledger as a CSV summary, one row per
/// submission, in ledger (insertion) order.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: &[OrderSubmission]) -> Result<()> {
        self.writer.write_record([
            "canteen",
            "item_count",
            "total",
            "payment_reference",
            "completed_at",
        ])?;
        for order in orders {
            self.writer.write_record([
                order.canteen_name.as_str(),
                &order.item_count.to_string(),
                &order.total_amount.value().to_string(),
                order.payment_reference.as_str(),
                &order.payment_completed_at.to_rfc3339(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

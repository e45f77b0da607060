use crate::domain::codec;
use crate::domain::order::OrderSubmission;
use crate::domain::ports::OrderLedger;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Column Family holding encoded order submissions keyed by insertion
/// sequence number (big-endian, so iteration order is insertion order).
pub const CF_ORDERS: &str = "orders";
/// Column Family indexing payment references, the duplicate-settlement guard.
pub const CF_REFS: &str = "payment_refs";

/// A persistent pending-order ledger backed by RocksDB.
///
/// Entries are stored in their canonical encoded form so the on-disk ledger
/// is human-inspectable and survives process restarts. This struct is
/// thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// both column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_refs = ColumnFamilyDescriptor::new(CF_REFS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_refs])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CheckoutError::Storage(Box::new(std::io::Error::other(format!(
                "column family '{name}' not found"
            ))))
        })
    }

    fn next_sequence(&self) -> Result<u64> {
        let cf = self.cf(CF_ORDERS)?;
        let mut iter = self.db.iterator_cf(cf, IteratorMode::End);
        match iter.next() {
            Some(Ok((key, _value))) => {
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    CheckoutError::Storage(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "corrupt ledger sequence key",
                    )))
                })?;
                Ok(u64::from_be_bytes(bytes) + 1)
            }
            Some(Err(err)) => Err(err.into()),
            None => Ok(0),
        }
    }
}

#[async_trait]
impl OrderLedger for RocksDbLedger {
    async fn save(&self, order: OrderSubmission) -> Result<()> {
        let refs = self.cf(CF_REFS)?;
        let ref_key = order.payment_reference.as_str().as_bytes().to_vec();
        if self.db.get_pinned_cf(refs, &ref_key)?.is_some() {
            return Err(CheckoutError::DuplicatePaymentReference(
                order.payment_reference,
            ));
        }

        let sequence = self.next_sequence()?;
        let encoded = codec::encode(&order)?;
        let orders = self.cf(CF_ORDERS)?;
        self.db
            .put_cf(orders, sequence.to_be_bytes(), encoded.as_bytes())?;
        self.db.put_cf(refs, ref_key, sequence.to_be_bytes())?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<OrderSubmission>> {
        let cf = self.cf(CF_ORDERS)?;
        let mut orders = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let text = std::str::from_utf8(&value).map_err(|err| {
                CheckoutError::Storage(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("non-UTF-8 ledger entry: {err}"),
                )))
            })?;
            orders.push(codec::decode(text)?);
        }

        Ok(orders)
    }

    async fn clear_all(&self) -> Result<usize> {
        let mut cleared = 0usize;
        for name in [CF_ORDERS, CF_REFS] {
            let cf = self.cf(name)?;
            let keys: Vec<Box<[u8]>> = self
                .db
                .iterator_cf(cf, IteratorMode::Start)
                .map(|item| item.map(|(key, _value)| key))
                .collect::<std::result::Result<_, _>>()?;
            for key in keys {
                if name == CF_ORDERS {
                    cleared += 1;
                }
                self.db.delete_cf(cf, key)?;
            }
        }
        info!(cleared, "cleared the pending-order ledger");
        Ok(cleared)
    }
}

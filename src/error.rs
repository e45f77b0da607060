use crate::domain::order::PaymentReference;
use crate::domain::session::SessionId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("malformed payment callback: {0}")]
    MalformedCallback(String),
    #[error("no active checkout session matches '{0}'")]
    SessionNotFound(SessionId),
    #[error("payment '{0}' is already recorded in the ledger")]
    DuplicatePaymentReference(PaymentReference),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("could not encode order submission: {0}")]
    Encode(String),
    #[error("could not decode order submission: {0}")]
    Decode(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

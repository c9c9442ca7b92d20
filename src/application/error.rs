use thiserror::Error;

use crate::domain::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Transaction id '{0}' matches more than one transaction")]
    AmbiguousTransactionId(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Stored ledger is invalid: {0}")]
    CorruptSnapshot(ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

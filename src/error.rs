use crate::domain::account::{AccountId, Balance};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitterError>;

#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("not the owner: account {caller} is not the administrator")]
    Authorization { caller: AccountId },
    #[error("Invalid value: {0}")]
    Value(#[from] ValueViolation),
    #[error("Invalid state: {0}")]
    State(#[from] StateViolation),
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferFailure),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Malformed call: {0}")]
    MalformedCall(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[error(
        "ledger and mechanism out of step: persisting failed ({persist}) and reversing transfers failed ({reversal})"
    )]
    Unreconciled {
        persist: Box<SplitterError>,
        reversal: Box<SplitterError>,
    },
}

/// Rejections raised before any state is inspected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueViolation {
    #[error("amount must exceed zero")]
    ZeroAmount,
    #[error("participant cannot be the null account")]
    NullParticipant,
    #[error("participants must be distinct, got {0} twice")]
    DuplicateParticipant(AccountId),
    #[error("account {0} is reserved for the mechanism")]
    ReservedAccount(AccountId),
}

/// Operations that are well-formed but not allowed in the current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateViolation {
    #[error("at least two participants required")]
    NotEstablished,
    #[error("participants already established")]
    AlreadyEstablished,
    #[error("mechanism is inactive")]
    Inactive,
    #[error("nothing to release: pending pool holds {0}")]
    NothingToRelease(Balance),
}

/// Failures reported by the value-transfer primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    #[error("destination is the null account")]
    NullDestination,
    #[error("account {account} holds {available}, needs {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Balance,
        requested: Balance,
    },
    #[error("balance of account {0} would overflow")]
    BalanceOverflow(AccountId),
    #[error("transfer to {destination} rejected: {reason}")]
    Rejected {
        destination: AccountId,
        reason: String,
    },
}

impl SplitterError {
    /// Wraps any backend error that has no dedicated variant.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::InternalError(error.into())
    }
}

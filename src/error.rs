use thiserror::Error;

/// Failures raised by the account store and the ledger operations.
///
/// The first four variants are caller mistakes and are never retried.
/// `Storage` and `LockPoisoned` are server-side failures; a transfer that
/// hits one of them has already been rolled back when the error is returned.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0} (must be a positive number)")]
    InvalidAmount(f64),

    #[error("Source account not found: {0}")]
    SourceNotFound(String),

    #[error("Destination account not found: {0}")]
    DestinationNotFound(String),

    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: String,
        balance: f64,
        requested: f64,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Account store lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// True for errors caused by the request itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidAmount(_)
                | LedgerError::SourceNotFound(_)
                | LedgerError::DestinationNotFound(_)
                | LedgerError::InsufficientFunds { .. }
                | LedgerError::AccountNotFound(_)
        )
    }
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

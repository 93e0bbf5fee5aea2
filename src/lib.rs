// Peer Ledger - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use db::{Account, SEED_ACCOUNTS};
pub use error::LedgerError;
pub use ledger::{
    AdviceReport, AdviceTier, BalanceReport, Ledger, TransferReceipt,
    ANALYSIS_VERSION, CURRENCY,
};
pub use store::AccountStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

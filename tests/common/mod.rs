// Helpers are shared across test files that are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use peer_ledger::config::StoreConfig;
use peer_ledger::Ledger;
use tempfile::TempDir;

/// Seeded ledger backed by a file in a temporary directory
pub fn test_ledger() -> Result<(Ledger, StoreConfig, TempDir)> {
    let temp_dir = TempDir::new()?;
    let config = StoreConfig {
        db_path: temp_dir.path().join("test.db"),
    };
    let ledger = config.open_ledger()?;
    Ok((ledger, config, temp_dir))
}

pub fn balance_of(ledger: &Ledger, name: &str) -> f64 {
    ledger.get_balance(name).unwrap().balance
}

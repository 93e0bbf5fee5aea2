mod common;

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use common::{balance_of, test_ledger};
use peer_ledger::{AdviceTier, LedgerError};

#[test]
fn test_seeded_accounts() -> Result<()> {
    let (ledger, _config, _temp) = test_ledger()?;

    assert_eq!(balance_of(&ledger, "pepe"), 1500.0);
    assert_eq!(balance_of(&ledger, "maria"), 3000.0);
    assert_eq!(balance_of(&ledger, "juan"), 50.0);
    assert_eq!(balance_of(&ledger, "desconocido"), 0.0);

    Ok(())
}

#[test]
fn test_transfer_then_insufficient_funds_scenario() -> Result<()> {
    let (ledger, _config, _temp) = test_ledger()?;

    let receipt = ledger.transfer("pepe", "juan", 500.0)?;
    assert_eq!(receipt.source_balance, 1000.0);
    assert_eq!(receipt.destination_balance, 550.0);
    assert_eq!(balance_of(&ledger, "pepe"), 1000.0);

    let err = ledger.transfer("juan", "pepe", 10000.0).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(balance_of(&ledger, "juan"), 550.0);
    assert_eq!(balance_of(&ledger, "pepe"), 1000.0);

    Ok(())
}

#[test]
fn test_transfers_persist_across_restart() -> Result<()> {
    let (ledger, config, _temp) = test_ledger()?;
    ledger.transfer("MARIA", "Juan", 1000.0)?;
    drop(ledger);

    let reopened = config.open_ledger()?;
    assert_eq!(balance_of(&reopened, "maria"), 2000.0);
    assert_eq!(balance_of(&reopened, "juan"), 1050.0);
    assert_eq!(reopened.get_advice("juan")?.tier, AdviceTier::SafeCushion);
    assert_eq!(reopened.get_advice("maria")?.tier, AdviceTier::StrongPosition);

    Ok(())
}

#[test]
fn test_parallel_transfers_conserve_total() -> Result<()> {
    let (ledger, _config, _temp) = test_ledger()?;
    let ledger = Arc::new(ledger);
    let total_before: f64 = ledger.list_accounts()?.iter().map(|a| a.balance).sum();

    // Transfers in both directions between all three accounts
    let routes = [("pepe", "maria"), ("maria", "juan"), ("juan", "pepe"), ("maria", "pepe")];
    let handles: Vec<_> = routes
        .into_iter()
        .map(|(from, to)| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..25 {
                    let _ = ledger.transfer(from, to, 40.0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("transfer thread panicked");
    }

    let accounts = ledger.list_accounts()?;
    let total_after: f64 = accounts.iter().map(|a| a.balance).sum();

    assert!((total_before - total_after).abs() < 1e-6);
    assert!(accounts.iter().all(|a| a.balance >= 0.0), "{accounts:?}");

    Ok(())
}

// Ledger Operations - balance queries, advice tiers, and transfers
//
// Read path: unknown accounts read as balance 0.
// Write path: unknown accounts are errors.
// The asymmetry is part of the public contract.

use rusqlite::Connection;

use crate::db::{self, normalize_name, Account};
use crate::error::{LedgerError, Result};
use crate::store::{apply_delta, AccountStore};

/// The single currency every balance is denominated in.
pub const CURRENCY: &str = "EUR";

/// Tag reported with every advice so clients can tell rule sets apart.
pub const ANALYSIS_VERSION: &str = "umbral-v1";

// ============================================================================
// ADVICE TIERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceTier {
    /// balance < 0
    Critical,

    /// 0 <= balance < 100
    LowMargin,

    /// 100 <= balance < 2000
    SafeCushion,

    /// balance >= 2000
    StrongPosition,
}

impl AdviceTier {
    /// Classify a balance. Thresholds are checked in order, first match wins.
    pub fn for_balance(balance: f64) -> Self {
        if balance < 0.0 {
            AdviceTier::Critical
        } else if balance < 100.0 {
            AdviceTier::LowMargin
        } else if balance < 2000.0 {
            AdviceTier::SafeCushion
        } else {
            AdviceTier::StrongPosition
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceTier::Critical => "critical: negative balance",
            AdviceTier::LowMargin => "low margin",
            AdviceTier::SafeCushion => "safe cushion",
            AdviceTier::StrongPosition => "strong position, consider investing",
        }
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    /// Name as the caller wrote it
    pub name: String,
    pub balance: f64,
    pub currency: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdviceReport {
    /// Name as the caller wrote it
    pub name: String,
    pub analysis_version: &'static str,
    pub tier: AdviceTier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferReceipt {
    pub source: String,
    pub destination: String,
    pub amount: f64,
    pub source_balance: f64,
    pub destination_balance: f64,
}

// ============================================================================
// LEDGER
// ============================================================================

/// Sole mutator of the account store.
///
/// The store is owned and never handed out, so every balance change goes
/// through `transfer`.
#[derive(Debug)]
pub struct Ledger {
    store: AccountStore,
}

impl Ledger {
    pub fn new(store: AccountStore) -> Self {
        Self { store }
    }

    /// Current balance of `name`. Unknown accounts report 0.
    pub fn get_balance(&self, name: &str) -> Result<BalanceReport> {
        let balance = self.balance_or_zero(name)?;

        Ok(BalanceReport {
            name: name.to_string(),
            balance,
            currency: CURRENCY,
        })
    }

    /// Advice tier for the balance of `name`. Unknown accounts read as 0.
    pub fn get_advice(&self, name: &str) -> Result<AdviceReport> {
        let balance = self.balance_or_zero(name)?;
        let tier = AdviceTier::for_balance(balance);
        tracing::debug!(account = %name, balance, tier = tier.as_str(), "advice computed");

        Ok(AdviceReport {
            name: name.to_string(),
            analysis_version: ANALYSIS_VERSION,
            tier,
        })
    }

    /// Move `amount` from `source` to `destination`.
    ///
    /// Checks run in this order, first failure wins: amount is positive,
    /// source exists, destination exists, source balance covers the amount.
    /// Validation and both writes happen inside one transaction, so either
    /// both balances change or neither does.
    pub fn transfer(&self, source: &str, destination: &str, amount: f64) -> Result<TransferReceipt> {
        let source = normalize_name(source);
        let destination = normalize_name(destination);

        let outcome = if !amount.is_finite() || amount <= 0.0 {
            Err(LedgerError::InvalidAmount(amount))
        } else {
            self.store
                .with_transaction(|conn| execute_transfer(conn, &source, &destination, amount))
        };

        match &outcome {
            Ok(receipt) => tracing::info!(
                source = %receipt.source,
                destination = %receipt.destination,
                amount,
                source_balance = receipt.source_balance,
                destination_balance = receipt.destination_balance,
                "transfer committed"
            ),
            Err(err) if err.is_client_error() => {
                tracing::warn!(%source, %destination, amount, error = %err, "transfer rejected")
            }
            Err(err) => {
                tracing::error!(%source, %destination, amount, error = %err, "transfer aborted")
            }
        }

        outcome
    }

    /// Every account with its balance, ordered by name.
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        self.store.list()
    }

    fn balance_or_zero(&self, name: &str) -> Result<f64> {
        Ok(self.store.get(name)?.unwrap_or(0.0))
    }
}

/// Validate and apply a transfer on an open transaction.
///
/// Names are already normalized and `amount` is already known to be positive.
fn execute_transfer(
    conn: &Connection,
    source: &str,
    destination: &str,
    amount: f64,
) -> Result<TransferReceipt> {
    let source_balance = db::fetch_balance(conn, source)?
        .ok_or_else(|| LedgerError::SourceNotFound(source.to_string()))?;

    let destination_balance = db::fetch_balance(conn, destination)?
        .ok_or_else(|| LedgerError::DestinationNotFound(destination.to_string()))?;

    if source_balance < amount {
        return Err(LedgerError::InsufficientFunds {
            account: source.to_string(),
            balance: source_balance,
            requested: amount,
        });
    }

    // Debit and credit cancel out; skip the writes.
    if source == destination {
        return Ok(TransferReceipt {
            source: source.to_string(),
            destination: destination.to_string(),
            amount,
            source_balance,
            destination_balance,
        });
    }

    let source_balance = apply_delta(conn, source, -amount)?;
    let destination_balance = apply_delta(conn, destination, amount)?;

    Ok(TransferReceipt {
        source: source.to_string(),
        destination: destination.to_string(),
        amount,
        source_balance,
        destination_balance,
    })
}

// Account Store - process-wide owner of the SQLite connection
//
// Every read and write goes through one Mutex<Connection>, and multi-statement
// work runs inside `with_transaction`, so a read-validate-write sequence can
// never interleave with another one.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};

use crate::db::{self, normalize_name, Account};
use crate::error::{LedgerError, Result};

/// How long a statement waits on a file lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AccountStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore").finish_non_exhaustive()
    }
}

impl AccountStore {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        tracing::info!(path = %path.display(), "account store opened");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the schema if needed.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        db::setup_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    /// Case-insensitive balance lookup. `None` means the account is unknown.
    pub fn get(&self, name: &str) -> Result<Option<f64>> {
        let conn = self.lock()?;
        db::fetch_balance(&conn, &normalize_name(name))
    }

    /// Add `amount` to an account. Returns the new balance.
    pub fn credit(&self, name: &str, amount: f64) -> Result<f64> {
        self.with_transaction(|conn| apply_delta(conn, name, amount))
    }

    /// Subtract `amount` from an account. Returns the new balance.
    ///
    /// No floor is enforced here; sufficiency is the caller's concern.
    pub fn debit(&self, name: &str, amount: f64) -> Result<f64> {
        self.with_transaction(|conn| apply_delta(conn, name, -amount))
    }

    /// Insert `accounts` if the table is empty, otherwise do nothing.
    /// Returns the number of accounts inserted.
    pub fn seed_if_empty(&self, accounts: &[(&str, f64)]) -> Result<usize> {
        self.with_transaction(|conn| {
            if db::count_accounts(conn)? > 0 {
                return Ok(0);
            }

            for (name, balance) in accounts {
                db::insert_account(conn, name, *balance)?;
            }

            Ok(accounts.len())
        })
    }

    /// All accounts, ordered by name.
    pub fn list(&self) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        db::get_all_accounts(&conn)
    }

    /// Run `f` inside a single `BEGIN IMMEDIATE` transaction while holding
    /// the store lock.
    ///
    /// Commits when `f` returns `Ok`. On `Err` every write made by `f` is
    /// rolled back and the original error is returned.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = {
            let inner: &Connection = &tx;
            f(inner)
        };

        match outcome {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Apply a signed delta to one account on `conn` and read back the result.
pub(crate) fn apply_delta(conn: &Connection, name: &str, delta: f64) -> Result<f64> {
    let name = normalize_name(name);

    if db::adjust_balance(conn, &name, delta)? == 0 {
        return Err(LedgerError::AccountNotFound(name));
    }

    db::fetch_balance(conn, &name)?.ok_or(LedgerError::AccountNotFound(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SEED_ACCOUNTS;

    fn seeded_store() -> AccountStore {
        let store = AccountStore::open_in_memory().unwrap();
        store.seed_if_empty(SEED_ACCOUNTS).unwrap();
        store
    }

    #[test]
    fn test_seed_if_empty_inserts_once() {
        let store = AccountStore::open_in_memory().unwrap();

        assert_eq!(store.seed_if_empty(SEED_ACCOUNTS).unwrap(), 3);
        assert_eq!(store.seed_if_empty(SEED_ACCOUNTS).unwrap(), 0);
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn test_seed_skips_non_empty_store() {
        let store = AccountStore::open_in_memory().unwrap();
        store.seed_if_empty(&[("ana", 10.0)]).unwrap();

        assert_eq!(store.seed_if_empty(SEED_ACCOUNTS).unwrap(), 0);
        assert_eq!(store.get("pepe").unwrap(), None);
        assert_eq!(store.get("ana").unwrap(), Some(10.0));
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let store = seeded_store();

        assert_eq!(store.get("PEPE").unwrap(), Some(1500.0));
        assert_eq!(store.get("Pepe").unwrap(), store.get("pepe").unwrap());
    }

    #[test]
    fn test_unknown_account_is_absent_not_zero() {
        let store = seeded_store();
        assert_eq!(store.get("nadie").unwrap(), None);
    }

    #[test]
    fn test_credit_and_debit() {
        let store = seeded_store();

        assert_eq!(store.credit("juan", 50.0).unwrap(), 100.0);
        assert_eq!(store.debit("JUAN", 150.0).unwrap(), -50.0);
        assert_eq!(store.get("juan").unwrap(), Some(-50.0));
    }

    #[test]
    fn test_debit_unknown_account() {
        let store = seeded_store();

        let err = store.debit("nadie", 1.0).unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(name) if name == "nadie"));
    }

    #[test]
    fn test_with_transaction_rolls_back_on_error() {
        let store = seeded_store();

        let result: Result<()> = store.with_transaction(|conn| {
            apply_delta(conn, "pepe", -500.0)?;
            apply_delta(conn, "nadie", 500.0)?;
            Ok(())
        });

        assert!(matches!(result, Err(LedgerError::AccountNotFound(_))));
        assert_eq!(store.get("pepe").unwrap(), Some(1500.0));
    }

    #[test]
    fn test_balances_survive_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = AccountStore::open(&path).unwrap();
            store.seed_if_empty(SEED_ACCOUNTS).unwrap();
            store.debit("maria", 250.0).unwrap();
        }

        let store = AccountStore::open(&path).unwrap();
        assert_eq!(store.seed_if_empty(SEED_ACCOUNTS).unwrap(), 0);
        assert_eq!(store.get("maria").unwrap(), Some(2750.0));
    }
}

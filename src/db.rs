use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Accounts inserted into an empty database at startup.
pub const SEED_ACCOUNTS: &[(&str, f64)] = &[("pepe", 1500.0), ("maria", 3000.0), ("juan", 50.0)];

/// One row of the `usuarios` table
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Lower-cased account name (primary key)
    pub name: String,

    /// Balance in EUR
    pub balance: f64,
}

/// Account names are keys under case-insensitive comparison.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery; in-memory databases report "memory" instead
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(journal_mode = %mode, "journal mode set");

    // ==========================================================================
    // Accounts Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS usuarios (
            nombre TEXT PRIMARY KEY NOT NULL,
            saldo REAL NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Balance of `name`, or `None` when no such row exists.
///
/// `name` must already be normalized.
pub fn fetch_balance(conn: &Connection, name: &str) -> Result<Option<f64>> {
    let balance = conn
        .query_row(
            "SELECT saldo FROM usuarios WHERE nombre = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    Ok(balance)
}

/// Add `delta` to the balance of `name`. Returns the number of rows changed
/// (0 when the account does not exist).
pub fn adjust_balance(conn: &Connection, name: &str, delta: f64) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE usuarios SET saldo = saldo + ?1 WHERE nombre = ?2",
        params![delta, name],
    )?;

    Ok(changed)
}

pub fn insert_account(conn: &Connection, name: &str, balance: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO usuarios (nombre, saldo) VALUES (?1, ?2)",
        params![normalize_name(name), balance],
    )?;

    Ok(())
}

pub fn count_accounts(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM usuarios", [], |row| row.get(0))?;

    Ok(count)
}

pub fn get_all_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT nombre, saldo FROM usuarios ORDER BY nombre")?;

    let accounts = stmt
        .query_map([], |row| {
            Ok(Account {
                name: row.get(0)?,
                balance: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(accounts)
}

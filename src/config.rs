// Runtime configuration shared by the CLI and the server.
// Every flag falls back to an environment variable.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

use crate::db::SEED_ACCOUNTS;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::store::AccountStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// SQLite database file (created if missing)
    #[arg(long = "db", env = "LEDGER_DB_PATH", default_value = "ledger.db")]
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Open the database and seed the fixed test accounts if it is empty.
    ///
    /// Must complete before any request is served.
    pub fn open_ledger(&self) -> Result<Ledger> {
        let store = AccountStore::open(&self.db_path)?;

        let seeded = store.seed_if_empty(SEED_ACCOUNTS)?;
        if seeded > 0 {
            tracing::info!(accounts = seeded, "seeded empty database");
        }

        Ok(Ledger::new(store))
    }
}

#[derive(Debug, Clone, Args)]
pub struct LogConfig {
    /// Log output format
    #[arg(long, env = "LEDGER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[cfg(feature = "server")]
pub use server::ServerConfig;

#[cfg(feature = "server")]
mod server {
    use std::net::SocketAddr;

    use clap::Parser;

    use super::{LogConfig, StoreConfig};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "peer-ledger-server", version, about = "HTTP API for the peer ledger")]
    pub struct ServerConfig {
        /// Address the HTTP listener binds to
        #[arg(long, env = "LEDGER_LISTEN_ADDR", default_value = "0.0.0.0:80")]
        pub listen_addr: SocketAddr,

        #[command(flatten)]
        pub store: StoreConfig,

        #[command(flatten)]
        pub log: LogConfig,
    }
}

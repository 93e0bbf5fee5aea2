use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use peer_ledger::config::{LogConfig, StoreConfig};
use peer_ledger::{logging, CURRENCY};

#[derive(Parser)]
#[command(
    name = "peer-ledger",
    version,
    about = "Operator commands for the peer ledger database"
)]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    log: LogConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the test accounts if it is empty
    Seed,

    /// Show the balance of an account (unknown accounts read as 0)
    Balance {
        /// Account name (case-insensitive)
        account: String,
    },

    /// Show the advice tier for an account
    Advice {
        /// Account name (case-insensitive)
        account: String,
    },

    /// Move funds from one account to another
    Transfer {
        /// Source account
        from: String,
        /// Destination account
        to: String,
        /// Amount in EUR (must be positive)
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// List all accounts
    #[command(alias = "ls")]
    Accounts,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log, "warn");

    let ledger = cli
        .store
        .open_ledger()
        .with_context(|| format!("Failed to open ledger at {}", cli.store.db_path.display()))?;

    match cli.command {
        Commands::Seed => {
            let count = ledger.list_accounts()?.len();
            println!("✓ Database ready: {} ({} accounts)", cli.store.db_path.display(), count);
        }
        Commands::Balance { account } => {
            let report = ledger.get_balance(&account)?;
            println!("{}: {:.2} {}", report.name, report.balance, report.currency);
        }
        Commands::Advice { account } => {
            let report = ledger.get_advice(&account)?;
            println!("{} [{}]: {}", report.name, report.analysis_version, report.tier.as_str());
        }
        Commands::Transfer { from, to, amount } => {
            let receipt = ledger
                .transfer(&from, &to, amount)
                .context("Transfer failed")?;
            println!("✓ Transferred {:.2} {} from {} to {}", amount, CURRENCY, receipt.source, receipt.destination);
            println!("  {}: {:.2}", receipt.source, receipt.source_balance);
            println!("  {}: {:.2}", receipt.destination, receipt.destination_balance);
        }
        Commands::Accounts => {
            for account in ledger.list_accounts()? {
                println!("{:<20} {:>12.2} {}", account.name, account.balance, CURRENCY);
            }
        }
    }

    Ok(())
}

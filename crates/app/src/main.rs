use std::{fs, path::Path};

use clap::{Args, Parser, Subcommand};
use engine::{LedgerSnapshot, MemoryLedger, Money};
use serde::Serialize;

use error::{AppError, Result};

mod commands;
mod error;
mod settings;

#[derive(Parser, Debug)]
#[command(name = "settleup")]
#[command(about = "Net and settle shared expenses recorded in a ledger file")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the ledger snapshot path.
    #[arg(long)]
    ledger: Option<String>,
    /// Override the log level (e.g. `debug`).
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show who a user owes and who owes them, netted per counterparty.
    Balances(BalancesArgs),
    /// Show how a payment would be allocated, without recording it.
    Plan(SettleArgs),
    /// Record a payment and update the ledger.
    Settle(SettleArgs),
    /// Flag every bill whose splits are all settled as paid.
    Complete,
}

#[derive(Args, Debug)]
struct BalancesArgs {
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug)]
struct SettleArgs {
    /// Username of the payer.
    #[arg(long)]
    from: String,
    /// Username of the payee.
    #[arg(long)]
    to: String,
    /// Amount paid, e.g. `12.50` or `12,50`.
    #[arg(long)]
    amount: Money,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = settings::Settings::new(cli.config.as_deref())?;
    if let Some(path) = cli.ledger {
        settings.ledger.path = path;
    }
    if let Some(level) = cli.level {
        settings.app.level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "settleup={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    run(cli.command, &settings)?;
    Ok(())
}

fn run(command: Command, settings: &settings::Settings) -> Result<()> {
    let path = Path::new(&settings.ledger.path);
    let ledger = load_ledger(path)?;
    tracing::debug!("loaded ledger from {}", path.display());

    match command {
        Command::Balances(args) => print_json(&commands::balances(ledger, &args.user)?),
        Command::Plan(args) => print_json(&commands::plan(
            ledger,
            &args.from,
            &args.to,
            args.amount,
        )?),
        Command::Settle(args) => {
            let (body, ledger) = commands::settle(ledger, &args.from, &args.to, args.amount)?;
            save_ledger(path, &ledger, settings.ledger.pretty)?;
            print_json(&body)
        }
        Command::Complete => {
            let (body, ledger) = commands::complete(ledger)?;
            save_ledger(path, &ledger, settings.ledger.pretty)?;
            print_json(&body)
        }
    }
}

fn load_ledger(path: &Path) -> Result<MemoryLedger> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let snapshot: LedgerSnapshot = serde_json::from_str(&raw)?;
    Ok(MemoryLedger::try_from(snapshot)?)
}

/// Writes to a sibling temp file, then renames it over `path`.
fn save_ledger(path: &Path, ledger: &MemoryLedger, pretty: bool) -> Result<()> {
    let snapshot = ledger.snapshot();
    let body = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    let io_err = |source| AppError::Io {
        path: path.display().to_string(),
        source,
    };
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    tracing::info!("ledger written to {}", path.display());
    Ok(())
}

fn print_json<T: Serialize>(body: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

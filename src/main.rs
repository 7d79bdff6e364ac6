//! Coin sweeper command line host.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::prelude::*;

use coinsweeper::amount::{self, AmountSpec};
use coinsweeper::data_source::BlockchainDataSource;
use coinsweeper::monitor::SweepMonitor;
use coinsweeper::scheduler::Scheduler;
use coinsweeper::store::SweepStore;
use coinsweeper::threshold::{is_valid_component, DurationComponent, DurationThreshold};
use coinsweeper::tx_submitter::BlockchainSubmitter;
use coinsweeper::types::{to_subunits, WatchEntry, SUBUNIT_SCALE};

/// Fiat currency used for `$`-denominated destination amounts.
const FIAT_CURRENCY: &str = "USD";

#[derive(Parser)]
#[command(name = "coinsweeper")]
struct Cli {
    /// Encrypted data file holding the watch list
    #[arg(short, long, default_value = "coinsweep.dat")]
    file: PathBuf,

    /// Prompt for the passphrase even if COINSWEEPER_PASSPHRASE is set
    #[arg(short, long)]
    password: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single sweep pass over the watch list
    Once,

    /// Run sweep passes continuously on an interval
    Continuous {
        /// Seconds between passes
        #[arg(long, default_value = "3600")]
        interval: u64,
    },

    /// Add an address to the watch list (replaces an existing entry)
    AddWatch {
        #[arg(long)]
        address: String,

        /// Private key, passed through to the submission service
        #[arg(long)]
        private_key: String,

        /// Minimum balance before sweeping, in whole coins
        #[arg(long, default_value = "0")]
        balance: f64,

        #[arg(long, default_value = "0")]
        years: u32,

        /// Months to wait (0-12)
        #[arg(long, default_value = "0")]
        months: u32,

        /// Weeks to wait (0-52)
        #[arg(long, default_value = "0")]
        weeks: u32,

        /// Days to wait (0-31)
        #[arg(long, default_value = "1")]
        days: u32,

        /// Hours to wait (0-24)
        #[arg(long, default_value = "0")]
        hours: u32,
    },

    /// Add a destination to a watched address
    AddDestination {
        /// The watched address
        #[arg(long)]
        address: String,

        /// Where to send
        #[arg(long)]
        destination: String,

        /// How much: "N%" percent, "N" subunits, "N.M" coins, "$N.M" dollars,
        /// "0" for a share of the remaining balance
        #[arg(long)]
        amount: String,
    },

    /// Remove a destination from a watched address
    RemoveDestination {
        #[arg(long)]
        address: String,

        #[arg(long)]
        destination: String,
    },

    /// Print the watch list, including private keys
    List,
}

fn read_passphrase(force_prompt: bool) -> Result<String> {
    if !force_prompt {
        if let Ok(passphrase) = std::env::var("COINSWEEPER_PASSPHRASE") {
            return Ok(passphrase);
        }
    }
    rpassword::prompt_password("Passphrase: ").context("failed to read passphrase")
}

fn validated_threshold(
    years: u32,
    months: u32,
    weeks: u32,
    days: u32,
    hours: u32,
) -> Result<DurationThreshold> {
    let components = [
        (DurationComponent::Years, years),
        (DurationComponent::Months, months),
        (DurationComponent::Weeks, weeks),
        (DurationComponent::Days, days),
        (DurationComponent::Hours, hours),
    ];
    for (kind, value) in components {
        if !is_valid_component(kind, value) {
            bail!("{kind:?} out of range: {value}");
        }
    }
    Ok(DurationThreshold::new(years, months, weeks, days, hours)?)
}

fn describe_amount(spec: &str) -> String {
    match amount::classify(spec) {
        Ok(AmountSpec::Percentage(p)) => format!("{p} percent"),
        Ok(AmountSpec::FixedFiat(f)) => format!("${f}"),
        Ok(AmountSpec::FixedUnits(f)) => format!("{f} coins"),
        Ok(AmountSpec::FixedSubunits(n)) => format!("{n} subunits"),
        Ok(AmountSpec::Remainder) => "a share of the remaining balance".to_string(),
        Err(_) => format!("INVALID SPEC {spec:?}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinsweeper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let passphrase = read_passphrase(cli.password)?;
    let store = SweepStore::new(cli.file.clone(), &passphrase);

    info!("loading watch list from {}", cli.file.display());
    let mut list = store.load().await?;

    match cli.command {
        Commands::AddWatch {
            address,
            private_key,
            balance,
            years,
            months,
            weeks,
            days,
            hours,
        } => {
            let time_threshold = validated_threshold(years, months, weeks, days, hours)?;
            if balance < 0.0 {
                bail!("balance threshold must be non-negative");
            }
            let balance_threshold = to_subunits(balance);
            info!(
                "watching {address} (threshold: {balance_threshold} subunits)"
            );
            list.upsert(WatchEntry::new(
                address,
                private_key,
                balance_threshold,
                time_threshold,
            ));
            store.save(&list).await?;
        }

        Commands::AddDestination {
            address,
            destination,
            amount,
        } => {
            let entry = list
                .get_mut(&address)
                .with_context(|| format!("{address} is not being watched"))?;
            entry.add_destination(destination.clone(), amount.clone())?;
            info!("{destination} gets {}", describe_amount(&amount));
            store.save(&list).await?;
        }

        Commands::RemoveDestination {
            address,
            destination,
        } => {
            let entry = list
                .get_mut(&address)
                .with_context(|| format!("{address} is not being watched"))?;
            if !entry.remove_destination(&destination) {
                bail!("{destination} is not a destination of {address}");
            }
            store.save(&list).await?;
        }

        Commands::List => {
            if list.is_empty() {
                println!("watch list is empty");
            }
            for entry in list.entries() {
                println!("{}", entry.address);
                println!("  private key: {}", entry.private_key);
                println!(
                    "  balance threshold: {} subunits ({} coins)",
                    entry.balance_threshold,
                    entry.balance_threshold as f64 / SUBUNIT_SCALE
                );
                println!("  time threshold: {}", entry.time_threshold);
                for dest in entry.destinations() {
                    println!("  # {} gets {}", dest.address, describe_amount(&dest.amount));
                }
            }
        }

        Commands::Once => {
            let monitor = service_monitor();
            let report = monitor.process_all(list.entries()).await;
            for (address, result) in &report {
                println!("{address}: {result}");
            }
        }

        Commands::Continuous { interval } => {
            let scheduler = Scheduler::new(Arc::new(service_monitor()), interval);
            let ctrl_c = signal::ctrl_c();

            tokio::select! {
                _ = scheduler.run_continuous(list.entries()) => {}
                _ = ctrl_c => {
                    info!("received ctrl-c, shutting down");
                }
            }
        }
    }

    Ok(())
}

fn service_monitor() -> SweepMonitor {
    SweepMonitor::new(
        Arc::new(BlockchainDataSource::new()),
        Arc::new(BlockchainSubmitter::new()),
        FIAT_CURRENCY,
    )
}

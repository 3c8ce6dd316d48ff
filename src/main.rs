//! Cardhoard main entry point
//!
//! Command-line interface for the card-catalog harvester.

use cardhoard::config::load_config_with_hash;
use cardhoard::db;
use cardhoard::dispatch::run_gather;
use cardhoard::store::{FsRecordStore, RecordStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Cardhoard: a card-catalog harvester
///
/// Harvests every printing from the configured catalog into a directory
/// of raw records, then loads those records into a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "cardhoard")]
#[command(version)]
#[command(about = "Harvests card printings into raw records and SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover every set and fetch every printing not yet stored
    Gather,

    /// Load stored records into the SQLite database
    Load,

    /// Show record store and database counts
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {config_hash})");

    match cli.command {
        Command::Gather => handle_gather(&config).await?,
        Command::Load => handle_load(&config)?,
        Command::Stats => handle_stats(&config)?,
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cardhoard=info,warn"),
            1 => EnvFilter::new("cardhoard=debug,info"),
            2 => EnvFilter::new("cardhoard=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the gather subcommand: runs the dispatch engine to quiescence
async fn handle_gather(config: &cardhoard::Config) -> anyhow::Result<()> {
    let report = run_gather(config).await?;

    println!(
        "✓ Gather finished: {} tasks completed in {:.1}s",
        report.tasks_completed,
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Handles the load subcommand: bulk-loads stored records into SQLite
fn handle_load(config: &cardhoard::Config) -> anyhow::Result<()> {
    let store = FsRecordStore::new(&config.storage.records_dir)?;
    let mut conn = db::open_database(Path::new(&config.storage.database_path))?;

    let summary = db::load_store(&mut conn, &store)?;

    println!(
        "✓ Load finished: {} records loaded, {} skipped",
        summary.loaded, summary.skipped
    );
    Ok(())
}

/// Handles the stats subcommand: prints store and database counts
fn handle_stats(config: &cardhoard::Config) -> anyhow::Result<()> {
    let store = FsRecordStore::new(&config.storage.records_dir)?;
    let conn = db::open_database(Path::new(&config.storage.database_path))?;

    let records = store.list()?.len();
    let counts = db::table_counts(&conn)?;

    println!("Record store: {}", config.storage.records_dir);
    println!("  raw records: {records}");
    println!("Database: {}", config.storage.database_path);
    println!("  sets:      {}", counts.sets);
    println!("  artists:   {}", counts.artists);
    println!("  cards:     {}", counts.cards);
    println!("  printings: {}", counts.printings);

    Ok(())
}

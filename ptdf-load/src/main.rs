//! ptdf-load - bulk loader for the plain text data files
//!
//! Reads the compressed list files of a data directory and loads titles,
//! persons and their facts into a SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use ptdf_common::config::{resolve_data_dir, resolve_database, LoaderConfig};
use ptdf_load::services::spawn_interrupt_listener;
use ptdf_load::{MemoryStore, Phase, PipelineOrchestrator, RunOutcome, SqliteStore, Store};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for ptdf-load
#[derive(Parser, Debug)]
#[command(name = "ptdf-load")]
#[command(about = "Bulk loader for plain text movie data files")]
#[command(version)]
struct Args {
    /// Directory containing the .list.gz data files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// SQLite database file to load into
    #[arg(short = 'u', long)]
    database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, env = "PTDF_CONFIG")]
    config: Option<PathBuf>,

    /// Drop and recreate the loader tables first
    #[arg(long)]
    drop_existing: bool,

    /// Continue numbering from the titles and persons already stored
    #[arg(long)]
    resume: bool,

    /// Parse everything but only count rows, nothing is written
    #[arg(long)]
    dry_run: bool,

    /// Run only this phase (repeatable)
    #[arg(long = "only", value_name = "PHASE")]
    only: Vec<Phase>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptdf_load=info,ptdf_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(RunOutcome::Completed) => {
            info!("Load completed");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Interrupted) => {
            warn!("Load interrupted, pending keys were flushed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Load failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<RunOutcome> {
    info!("Starting ptdf-load {}", env!("CARGO_PKG_VERSION"));

    let mut config = LoaderConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.drop_existing |= args.drop_existing;
    config.resume |= args.resume;

    let data_dir = resolve_data_dir(args.data_dir.as_deref(), &config)?;
    info!("Data directory: {}", data_dir.display());

    let store: Arc<dyn Store> = if args.dry_run {
        info!("Dry run: rows are counted, not written");
        Arc::new(MemoryStore::counting())
    } else {
        let db_path = resolve_database(args.database.as_deref(), &config);
        info!("Database: {}", db_path.display());
        let pool = ptdf_common::db::init_database(&db_path, config.drop_existing)
            .await
            .context("Failed to open database")?;
        Arc::new(SqliteStore::new(pool, config.max_batch_rows))
    };

    let cancel = CancellationToken::new();
    let listener = spawn_interrupt_listener(cancel.clone());

    let mut orchestrator = PipelineOrchestrator::new(store, data_dir, config).with_phases(&args.only);
    let outcome = orchestrator.run(cancel).await;
    listener.abort();

    let outcome = outcome?;
    for (phase, stats) in &orchestrator.statistics().phases {
        info!("{:<24} {}", phase.as_str(), stats.display_string());
    }
    Ok(outcome)
}

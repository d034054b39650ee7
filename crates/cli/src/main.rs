//! # profsync-cli
//!
//! Command-line entry point for the Faculty180 → Drupal profile sync, plus
//! the two connectivity diagnostics for manual troubleshooting.

mod diag;

use anyhow::Result;
use clap::{Parser, Subcommand};
use profsync::{pipeline, SyncConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "profsync")]
#[command(version)]
#[command(about = "Sync faculty profiles from Faculty180 into Drupal nodes.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the one-shot sync: one Drupal node per faculty record
    Sync,
    /// Verify connectivity and response shape of the Faculty180 API
    CheckSource,
    /// Verify Drupal reachability, authentication and node permissions
    CheckTarget,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = SyncConfig::from_env();

    match cli.command {
        Commands::Sync => handle_sync(&config).await,
        Commands::CheckSource => diag::check_source(&config).await,
        Commands::CheckTarget => diag::check_target(&config).await,
    }
}

/// A completed run exits 0 regardless of per-record failures; only
/// pre-flight aborts (missing configuration, authentication failure)
/// propagate a non-zero exit.
async fn handle_sync(config: &SyncConfig) -> Result<()> {
    info!("starting faculty sync run");
    let report = pipeline::run(config).await?;
    if report.total == 0 {
        println!("No data from Faculty180. Nothing to sync.");
    } else {
        println!(
            "Sync complete: {}/{} nodes created ({} failed).",
            report.created, report.total, report.failed
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

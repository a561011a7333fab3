//! CLI entry point for the catalog harvester.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::{HarvestConfig, Harvester};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Harvest failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let mut config = HarvestConfig::load(&args.config)
        .with_context(|| format!("cannot load config {}", args.config.display()))?;

    if let Some(max) = args.max_downloads {
        debug!(max, "downloadListMaxsize overridden from command line");
        config.connection.download_list_maxsize = max;
    }

    info!(
        url = %config.connection.url,
        db = %config.connection.db,
        query = %config.connection.query,
        "Harvester starting"
    );

    let mut harvester = Harvester::bootstrap(&config, &args.output_dir)
        .await
        .context("bootstrap failed")?;

    let stats = harvester.run().await.context("harvest aborted")?;

    info!(
        pages = stats.pages,
        attempted = stats.attempted,
        fetched = stats.fetched,
        fetch_failures = stats.fetch_failures,
        sink_failures = stats.sink_failures,
        target_total = stats.target_total,
        "Harvest complete"
    );

    Ok(())
}

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_info, engine_warn, LogDestination};
use scraper_engine::{cancel_on, interrupt_channel, Pool, ReqwestFetcher};

mod cli;
mod config;
mod console;
mod job_source;

use crate::cli::Args;
use crate::config::ScraperConfig;

#[tokio::main]
async fn main() {
    if let Err(err) = run(Args::parse()).await {
        eprintln!("scraper error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = ScraperConfig::resolve(&args)?;

    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, config.level_filter()?);

    let jobs = job_source::load_jobs(&config.input)?;
    engine_info!("loaded {} jobs from {}", jobs.len(), config.input.display());

    let settings = config.fetch_settings();
    if let Some(timeout) = settings.request_timeout {
        engine_warn!(
            "per-attempt request timeout of {:?} enabled; slow servers now fail instead of stalling",
            timeout
        );
    }
    let fetcher = Arc::new(ReqwestFetcher::new(settings).context("building http client")?);
    let mut pool = Pool::start(&config.pool_config(), fetcher, Arc::new(console::ConsoleSink))
        .context("starting worker pool")?;

    match interrupt_channel() {
        Ok(interrupts) => {
            tokio::spawn(cancel_on(interrupts, pool.cancellation_token(), || {
                println!("Shutting down...");
            }));
        }
        Err(err) => engine_warn!("interrupt handler unavailable: {}", err),
    }

    pool.spawn_feeder(jobs);
    let summary = pool.drain(console::print_result).await;
    engine_info!(
        "done: {} results ({} fetched, {} failed)",
        summary.results(),
        summary.fetched,
        summary.failed
    );
    Ok(())
}

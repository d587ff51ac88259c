use std::path::PathBuf;

use clap::Parser;

/// Fetch every URL of a list through a bounded pool of workers.
///
/// Flags override values from `--config`; anything unset falls back to the
/// built-in defaults.
#[derive(Debug, Default, Parser)]
#[command(name = "scraper", version)]
pub struct Args {
    /// File with one URL per line (default: urls.txt).
    pub input: Option<PathBuf>,

    /// RON file with a `ScraperConfig`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of concurrent workers (default: 5).
    #[arg(long)]
    pub workers: Option<usize>,

    /// GET attempts per URL, including the first (default: 3).
    #[arg(long)]
    pub attempts: Option<u32>,

    /// One backoff unit in milliseconds; retry n waits n units (default: 1000).
    #[arg(long = "backoff-ms")]
    pub backoff_ms: Option<u64>,

    /// Per-attempt request timeout in seconds. Off unless given.
    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// TCP connect timeout in seconds. Off unless given.
    #[arg(long = "connect-timeout-secs")]
    pub connect_timeout_secs: Option<u64>,

    /// Capacity of the job and result queues (default: 10).
    #[arg(long = "queue-capacity")]
    pub queue_capacity: Option<usize>,

    /// off, error, warn, info, debug or trace (default: info).
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

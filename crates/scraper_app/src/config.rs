use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::LevelFilter;
use scraper_engine::{FetchSettings, PoolConfig};
use serde::{Deserialize, Serialize};

use crate::cli::Args;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub input: PathBuf,
    pub workers: usize,
    pub max_attempts: u32,
    pub backoff_unit_ms: u64,
    /// `None` keeps the historical behavior: no request timeout at all.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub queue_capacity: usize,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("urls.txt"),
            workers: 5,
            max_attempts: 3,
            backoff_unit_ms: 1000,
            request_timeout_secs: None,
            connect_timeout_secs: None,
            queue_capacity: 10,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ScraperConfig {
    /// Defaults, then the `--config` file if any, then command-line flags.
    pub fn resolve(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(base.with_args(args))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn with_args(mut self, args: &Args) -> Self {
        if let Some(input) = &args.input {
            self.input = input.clone();
        }
        if let Some(workers) = args.workers {
            self.workers = workers;
        }
        if let Some(attempts) = args.attempts {
            self.max_attempts = attempts;
        }
        if let Some(ms) = args.backoff_ms {
            self.backoff_unit_ms = ms;
        }
        if let Some(secs) = args.timeout_secs {
            self.request_timeout_secs = Some(secs);
        }
        if let Some(secs) = args.connect_timeout_secs {
            self.connect_timeout_secs = Some(secs);
        }
        if let Some(capacity) = args.queue_capacity {
            self.queue_capacity = capacity;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(file) = &args.log_file {
            self.log_file = Some(file.clone());
        }
        self
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow!("invalid log level {:?}", self.log_level))
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            worker_count: self.workers,
            max_attempts: self.max_attempts,
            job_capacity: self.queue_capacity,
            result_capacity: self.queue_capacity,
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            backoff_unit: Duration::from_millis(self.backoff_unit_ms),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }
}

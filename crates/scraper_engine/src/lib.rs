//! Scraper engine: fetch with retry, worker loop and pool coordination.
mod fetch;
mod pool;
mod retry;
mod signal;
mod types;
mod worker;

pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use pool::{feed_jobs, Pool, PoolConfig, PoolSummary};
pub use retry::RetryPolicy;
pub use signal::{cancel_on, interrupt_channel};
pub use types::{AttemptError, FetchError, FetchedBody, NoticeSink, PoolError};
pub use worker::{run_worker, JobQueue, WorkerEnv, WorkerExit};

use std::sync::Arc;

use engine_logging::{engine_error, engine_info, engine_warn};
use scraper_core::{Job, ScrapeResult};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::worker::{run_worker, JobQueue, WorkerEnv, WorkerExit};
use crate::{Fetcher, NoticeSink, PoolError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub worker_count: usize,
    /// Attempts per job, including the first.
    pub max_attempts: u32,
    pub job_capacity: usize,
    pub result_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 5,
            max_attempts: 3,
            job_capacity: 10,
            result_capacity: 10,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.worker_count == 0 {
            return Err(PoolError::NoWorkers);
        }
        if self.max_attempts == 0 {
            return Err(PoolError::NoAttempts);
        }
        if self.job_capacity == 0 {
            return Err(PoolError::ZeroCapacity { queue: "job" });
        }
        if self.result_capacity == 0 {
            return Err(PoolError::ZeroCapacity { queue: "result" });
        }
        Ok(())
    }
}

/// Totals for one pool run, available after the results queue closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub fetched: usize,
    pub failed: usize,
    pub workers_drained: usize,
    pub workers_cancelled: usize,
    /// Jobs whose result a worker handed to the results queue.
    pub jobs_processed: usize,
}

impl PoolSummary {
    pub fn results(&self) -> usize {
        self.fetched + self.failed
    }
}

/// Owns the dispatch queue, the results queue and the cancellation token of
/// one pool of workers.
pub struct Pool {
    jobs_tx: Option<mpsc::Sender<Job>>,
    results_rx: mpsc::Receiver<ScrapeResult>,
    cancel: CancellationToken,
    barrier: JoinHandle<Vec<WorkerExit>>,
}

impl Pool {
    /// Spawns `worker_count` workers on the current tokio runtime.
    pub fn start(
        config: &PoolConfig,
        fetcher: Arc<dyn Fetcher>,
        notices: Arc<dyn NoticeSink>,
    ) -> Result<Self, PoolError> {
        config.validate()?;

        let (jobs_tx, jobs_rx) = mpsc::channel(config.job_capacity);
        let (results_tx, results_rx) = mpsc::channel(config.result_capacity);
        let cancel = CancellationToken::new();
        let jobs = JobQueue::new(jobs_rx);
        let env = Arc::new(WorkerEnv {
            fetcher,
            notices,
            max_attempts: config.max_attempts,
        });

        let mut workers = JoinSet::new();
        for worker_id in 0..config.worker_count {
            workers.spawn(run_worker(
                worker_id,
                cancel.clone(),
                jobs.clone(),
                results_tx.clone(),
                env.clone(),
            ));
        }
        engine_info!(
            "pool started: {} workers, {} attempts per job, capacities {}/{}",
            config.worker_count,
            config.max_attempts,
            config.job_capacity,
            config.result_capacity
        );

        let barrier = tokio::spawn(await_workers(workers, results_tx));

        Ok(Self {
            jobs_tx: Some(jobs_tx),
            results_rx,
            cancel,
            barrier,
        })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Raises the cancellation signal. Repeated calls have no further effect.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Hands out the producer side of the dispatch queue. The queue closes
    /// when the returned sender (and every clone of it) is dropped.
    pub fn take_job_sender(&mut self) -> Option<mpsc::Sender<Job>> {
        self.jobs_tx.take()
    }

    /// Feeds `jobs` in order from a background task, then closes the
    /// dispatch queue. Returns `None` if the sender was already taken.
    pub fn spawn_feeder<I>(&mut self, jobs: I) -> Option<JoinHandle<usize>>
    where
        I: IntoIterator<Item = Job> + Send + 'static,
        I::IntoIter: Send + 'static,
    {
        let tx = self.take_job_sender()?;
        let cancel = self.cancel.clone();
        Some(tokio::spawn(feed_jobs(jobs, tx, cancel)))
    }

    /// Hands every result to `on_result` until the results queue is closed
    /// and empty, which happens once every worker has returned.
    ///
    /// An untaken job sender is dropped first so the pool can finish.
    pub async fn drain<F>(mut self, mut on_result: F) -> PoolSummary
    where
        F: FnMut(&ScrapeResult),
    {
        drop(self.jobs_tx.take());

        let mut summary = PoolSummary::default();
        while let Some(result) = self.results_rx.recv().await {
            if result.is_success() {
                summary.fetched += 1;
            } else {
                summary.failed += 1;
            }
            on_result(&result);
        }

        match self.barrier.await {
            Ok(exits) => {
                for exit in exits {
                    let processed = match exit {
                        WorkerExit::Drained { processed } => {
                            summary.workers_drained += 1;
                            processed
                        }
                        WorkerExit::Cancelled { processed } => {
                            summary.workers_cancelled += 1;
                            processed
                        }
                        WorkerExit::SinkClosed { processed } => processed,
                    };
                    summary.jobs_processed += processed;
                }
            }
            Err(err) => engine_error!("pool barrier task failed: {}", err),
        }

        engine_info!(
            "pool finished: {} fetched, {} failed ({} processed), {} workers drained, {} cancelled",
            summary.fetched,
            summary.failed,
            summary.jobs_processed,
            summary.workers_drained,
            summary.workers_cancelled
        );
        summary
    }
}

/// Completion barrier: waits for every worker, then closes the results
/// queue by dropping the last sender.
async fn await_workers(
    mut workers: JoinSet<WorkerExit>,
    results_tx: mpsc::Sender<ScrapeResult>,
) -> Vec<WorkerExit> {
    let mut exits = Vec::with_capacity(workers.len());
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(exit) => exits.push(exit),
            Err(err) => engine_error!("worker task failed: {}", err),
        }
    }
    drop(results_tx);
    exits
}

/// Sends `jobs` in order into the dispatch queue, then closes it by dropping
/// `tx`. Stops early on cancellation or when no worker is left to receive.
///
/// Returns the number of jobs handed to the queue.
pub async fn feed_jobs<I>(jobs: I, tx: mpsc::Sender<Job>, cancel: CancellationToken) -> usize
where
    I: IntoIterator<Item = Job>,
{
    let mut sent = 0;
    for job in jobs {
        let delivered = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                engine_info!("job feed stopped by cancellation after {} jobs", sent);
                false
            }
            res = tx.send(job) => match res {
                Ok(()) => true,
                Err(_) => {
                    engine_warn!("job feed stopped: no workers left after {} jobs", sent);
                    false
                }
            },
        };
        if !delivered {
            break;
        }
        sent += 1;
    }
    sent
}

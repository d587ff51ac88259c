use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use scraper_core::{Job, ScrapeResult, WorkerId, WorkerNotice};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::{Fetcher, NoticeSink};

/// Consumer side of the dispatch queue, shared by every worker.
///
/// Each job is handed to exactly one caller of [`JobQueue::next`].
#[derive(Debug, Clone)]
pub struct JobQueue {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobQueue {
    pub fn new(rx: mpsc::Receiver<Job>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Next job, or `None` once the queue is closed and empty.
    ///
    /// Cancel safe: dropping the future never loses a job.
    pub async fn next(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }
}

/// What every worker of one pool shares besides the queues.
pub struct WorkerEnv {
    pub fetcher: Arc<dyn Fetcher>,
    pub notices: Arc<dyn NoticeSink>,
    pub max_attempts: u32,
}

/// How a worker loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Dispatch queue closed and empty.
    Drained { processed: usize },
    /// Cancellation observed between jobs.
    Cancelled { processed: usize },
    /// Nobody is reading results anymore.
    SinkClosed { processed: usize },
}

/// Runs one worker until the queue drains, cancellation is observed, or the
/// results receiver goes away.
///
/// Cancellation is only checked while waiting for the next job. A fetch that
/// has started, retries and backoff included, always finishes and its result
/// is still sent.
pub async fn run_worker(
    worker_id: WorkerId,
    cancel: CancellationToken,
    jobs: JobQueue,
    results: mpsc::Sender<ScrapeResult>,
    env: Arc<WorkerEnv>,
) -> WorkerExit {
    let mut processed = 0;
    loop {
        // biased: once cancelled, a ready job must not win the race.
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            job = jobs.next() => Some(job),
        };

        let job = match next {
            None => {
                env.notices.emit(WorkerNotice::Stopping { worker_id });
                return WorkerExit::Cancelled { processed };
            }
            Some(None) => {
                engine_debug!("worker {} drained after {} jobs", worker_id, processed);
                return WorkerExit::Drained { processed };
            }
            Some(Some(job)) => job,
        };

        let result = process_job(worker_id, job, &env).await;
        if results.send(result).await.is_err() {
            engine_warn!("worker {}: results receiver dropped, exiting", worker_id);
            return WorkerExit::SinkClosed { processed };
        }
        processed += 1;
    }
}

async fn process_job(worker_id: WorkerId, job: Job, env: &WorkerEnv) -> ScrapeResult {
    let url = job.into_url();
    match env.fetcher.fetch_with_retry(&url, env.max_attempts).await {
        Ok(body) => ScrapeResult::Fetched {
            worker_id,
            url,
            length: body.byte_len(),
        },
        Err(err) => ScrapeResult::Failed {
            worker_id,
            url,
            error: err.to_string(),
        },
    }
}

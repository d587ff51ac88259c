use std::fmt;

pub type WorkerId = usize;

/// Outcome of processing one job, tagged with the worker that handled it.
///
/// `Display` renders the console line for the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeResult {
    Fetched {
        worker_id: WorkerId,
        url: String,
        /// Body length in bytes.
        length: usize,
    },
    Failed {
        worker_id: WorkerId,
        url: String,
        error: String,
    },
}

impl ScrapeResult {
    pub fn worker_id(&self) -> WorkerId {
        match self {
            ScrapeResult::Fetched { worker_id, .. } | ScrapeResult::Failed { worker_id, .. } => {
                *worker_id
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ScrapeResult::Fetched { url, .. } | ScrapeResult::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Fetched { .. })
    }
}

impl fmt::Display for ScrapeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeResult::Fetched {
                worker_id,
                url,
                length,
            } => write!(f, "Worker {worker_id}: Fetched {url}, length: {length}"),
            ScrapeResult::Failed {
                worker_id,
                url,
                error,
            } => write!(f, "Worker {worker_id}: Error fetching {url}: {error}"),
        }
    }
}

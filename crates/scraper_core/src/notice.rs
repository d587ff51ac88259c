use std::fmt;

use crate::WorkerId;

/// Out-of-band worker lifecycle notices.
///
/// These never travel through the results queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerNotice {
    /// Worker observed cancellation and is exiting.
    Stopping { worker_id: WorkerId },
}

impl fmt::Display for WorkerNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerNotice::Stopping { worker_id } => write!(f, "[Worker {worker_id}] Stopping"),
        }
    }
}

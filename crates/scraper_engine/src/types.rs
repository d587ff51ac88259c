use std::borrow::Cow;

use scraper_core::WorkerNotice;
use thiserror::Error;

/// A fully buffered response body.
///
/// The raw bytes are kept as received; `text` is a lossy UTF-8 view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedBody {
    bytes: Vec<u8>,
}

impl FetchedBody {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Length in bytes as received, independent of any text decoding.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl From<String> for FetchedBody {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

/// Why a single GET attempt did not count as a success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The server answered, but not with 200.
    #[error("http status {0}")]
    Status(u16),
    /// The request never produced a response (DNS, connect, bad URL, timeout).
    #[error("{0}")]
    Transport(String),
}

/// Terminal failure of a fetch-with-retry call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed after {attempts} retries: {last_error}")]
    Exhausted {
        attempts: u32,
        last_error: AttemptError,
    },
    /// Reading a 200 body failed. Never retried.
    #[error("error reading body: {0}")]
    BodyRead(String),
    #[error("http client setup failed: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker count must be at least 1")]
    NoWorkers,
    #[error("max attempts must be at least 1")]
    NoAttempts,
    #[error("{queue} queue capacity must be at least 1")]
    ZeroCapacity { queue: &'static str },
}

/// Receiver for worker lifecycle notices.
pub trait NoticeSink: Send + Sync {
    fn emit(&self, notice: WorkerNotice);
}

use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};
use futures_util::StreamExt;
use reqwest::StatusCode;

use crate::{AttemptError, FetchError, FetchedBody, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// One time unit of linear backoff between attempts.
    pub backoff_unit: Duration,
    /// Per-attempt timeout. `None` lets a hung server stall the attempt forever.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            backoff_unit: Duration::from_secs(1),
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

/// Fetch a URL to a fully buffered body, retrying transient failures.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_with_retry(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<FetchedBody, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self { client, settings })
    }

    /// One GET. Only a 200 counts; every other status is an attempt failure.
    async fn attempt(&self, url: &str) -> Result<reqwest::Response, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| AttemptError::Transport(err.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch_with_retry(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<FetchedBody, FetchError> {
        let policy = RetryPolicy::new(max_attempts.max(1), self.settings.backoff_unit);
        let mut attempt = 0u32;
        loop {
            match self.attempt(url).await {
                Ok(response) => return read_body(response).await,
                Err(err) => match policy.delay_after(attempt) {
                    Some(delay) => {
                        engine_debug!(
                            "GET {} attempt {}/{} failed: {}; retrying in {:?}",
                            url,
                            attempt + 1,
                            policy.max_attempts,
                            err,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        engine_debug!(
                            "GET {} attempt {}/{} failed: {}; giving up",
                            url,
                            attempt + 1,
                            policy.max_attempts,
                            err
                        );
                        return Err(FetchError::Exhausted {
                            attempts: policy.max_attempts,
                            last_error: err,
                        });
                    }
                },
            }
        }
    }
}

/// Buffers the whole body. A read error here is terminal, not a retry.
async fn read_body(response: reqwest::Response) -> Result<FetchedBody, FetchError> {
    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| FetchError::BodyRead(err.to_string()))?;
        bytes.extend_from_slice(&chunk);
    }
    engine_trace!("read {} body bytes", bytes.len());
    Ok(FetchedBody::new(bytes))
}

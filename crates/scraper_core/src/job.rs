use std::fmt;

/// One unit of work: a URL to fetch.
///
/// The URL is carried verbatim. Nothing is validated here; a malformed line
/// becomes a job that fails at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    url: String,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_url(self) -> String {
        self.url
    }
}

impl From<&str> for Job {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

impl From<String> for Job {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Splits a job list into jobs, one per line, in file order.
///
/// Line terminators (`\n` or `\r\n`) are stripped, nothing else is: blank
/// lines and surrounding whitespace are passed through unchanged.
pub fn parse_job_list(raw: &str) -> Vec<Job> {
    raw.lines().map(Job::from).collect()
}

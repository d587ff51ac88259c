//! Reads the job list file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use scraper_core::{parse_job_list, Job};
use thiserror::Error;

/// The job list could not be read. Fatal at startup: the pool is never
/// started with an empty list because of it.
#[derive(Debug, Error)]
#[error("cannot read job list {}", .path.display())]
pub struct JobSourceError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

pub fn load_jobs(path: &Path) -> Result<Vec<Job>, JobSourceError> {
    let raw = fs::read_to_string(path).map_err(|source| JobSourceError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_job_list(&raw))
}

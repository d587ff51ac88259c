//! Scraper core: pure job and result types shared by the engine and the app.
mod job;
mod notice;
mod result;

pub use job::{parse_job_list, Job};
pub use notice::WorkerNotice;
pub use result::{ScrapeResult, WorkerId};

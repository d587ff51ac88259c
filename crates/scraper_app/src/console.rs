//! Stdout rendering. Logs go to stderr, so stdout carries only these lines.

use std::io::{self, Write};

use scraper_core::{ScrapeResult, WorkerNotice};
use scraper_engine::NoticeSink;

pub struct ConsoleSink;

impl NoticeSink for ConsoleSink {
    fn emit(&self, notice: WorkerNotice) {
        print_line(&notice);
    }
}

pub fn print_result(result: &ScrapeResult) {
    print_line(result);
}

fn print_line(line: &dyn std::fmt::Display) {
    // A closed stdout (e.g. piped into `head`) must not panic a worker.
    let _ = writeln!(io::stdout().lock(), "{line}");
}

use pretty_assertions::assert_eq;
use scraper_core::{parse_job_list, Job};

#[test]
fn jobs_follow_file_order() {
    let jobs = parse_job_list("http://b.test\nhttp://a.test\n");
    assert_eq!(jobs, vec![Job::from("http://b.test"), Job::from("http://a.test")]);
}

#[test]
fn lines_are_not_trimmed_or_filtered() {
    let jobs = parse_job_list("  http://a.test \n\nnot a url\r\nhttp://b.test");
    let urls: Vec<_> = jobs.iter().map(Job::url).collect();
    assert_eq!(urls, vec!["  http://a.test ", "", "not a url", "http://b.test"]);
}

#[test]
fn empty_input_has_no_jobs() {
    assert!(parse_job_list("").is_empty());
}

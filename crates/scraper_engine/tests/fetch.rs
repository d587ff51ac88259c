use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use scraper_engine::{AttemptError, FetchError, FetchSettings, Fetcher, ReqwestFetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const UNIT: Duration = Duration::from_millis(20);

/// Answers 500 and remembers when each request arrived.
#[derive(Clone, Default)]
struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl ArrivalLog {
    fn gaps(&self) -> Vec<Duration> {
        let arrivals = self.arrivals.lock().unwrap();
        arrivals.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

impl Respond for ArrivalLog {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(500)
    }
}

fn fast_fetcher() -> ReqwestFetcher {
    engine_logging::initialize_for_tests();
    ReqwestFetcher::new(FetchSettings {
        backoff_unit: UNIT,
        ..FetchSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn ok_response_returns_body_after_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/doc", server.uri());
    let body = fast_fetcher().fetch_with_retry(&url, 3).await.expect("fetch ok");
    assert_eq!(body.text(), "<html>ok</html>");
    assert_eq!(body.byte_len(), 15);
}

#[tokio::test]
async fn server_error_is_retried_until_budget_spent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/bad", server.uri());
    let started = Instant::now();
    let err = fast_fetcher().fetch_with_retry(&url, 3).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(
        err,
        FetchError::Exhausted {
            attempts: 3,
            last_error: AttemptError::Status(500),
        }
    );
    assert_eq!(err.to_string(), "failed after 3 retries: http status 500");
    // 1 + 2 units between the three attempts.
    assert!(elapsed >= UNIT * 3, "elapsed {elapsed:?}");
}

#[tokio::test]
async fn each_retry_waits_one_unit_longer_than_the_last() {
    let server = MockServer::start().await;
    let log = ArrivalLog::default();
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(log.clone())
        .expect(4)
        .mount(&server)
        .await;

    let url = format!("{}/down", server.uri());
    let err = fast_fetcher().fetch_with_retry(&url, 4).await.unwrap_err();
    assert!(matches!(err, FetchError::Exhausted { attempts: 4, .. }));

    let gaps = log.gaps();
    assert_eq!(gaps.len(), 3);
    for (i, gap) in gaps.iter().enumerate() {
        let floor = UNIT * (i as u32 + 1);
        assert!(*gap >= floor, "gap {i} was {gap:?}, expected at least {floor:?}");
    }
}

#[tokio::test]
async fn length_counts_raw_bytes_of_non_utf8_body() {
    let server = MockServer::start().await;
    let latin1 = b"caf\xe9 na\xefve".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(latin1.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/latin1", server.uri());
    let body = fast_fetcher().fetch_with_retry(&url, 3).await.expect("fetch ok");
    assert_eq!(body.byte_len(), 10);
    assert_eq!(body.as_bytes(), latin1.as_slice());
    assert_eq!(body.text(), "caf\u{fffd} na\u{fffd}ve");
}

#[tokio::test]
async fn client_error_does_not_short_circuit_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let err = fast_fetcher().fetch_with_retry(&url, 2).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Exhausted {
            attempts: 2,
            last_error: AttemptError::Status(404),
        }
    );
}

#[tokio::test]
async fn non_ok_success_status_is_still_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/empty", server.uri());
    let err = fast_fetcher().fetch_with_retry(&url, 1).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Exhausted {
            attempts: 1,
            last_error: AttemptError::Status(204),
        }
    );
}

#[tokio::test]
async fn success_stops_further_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("second time lucky"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/flaky", server.uri());
    let started = Instant::now();
    let body = fast_fetcher().fetch_with_retry(&url, 3).await.expect("fetch ok");
    assert_eq!(body.text(), "second time lucky");
    assert!(started.elapsed() >= UNIT);
}

#[tokio::test]
async fn malformed_url_fails_as_transport_error() {
    let err = fast_fetcher()
        .fetch_with_retry("not a url", 2)
        .await
        .unwrap_err();
    match err {
        FetchError::Exhausted {
            attempts,
            last_error: AttemptError::Transport(_),
        } => assert_eq!(attempts, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn optional_timeout_turns_slow_response_into_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        backoff_unit: UNIT,
        request_timeout: Some(Duration::from_millis(50)),
        ..FetchSettings::default()
    })
    .expect("client");
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch_with_retry(&url, 2).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Exhausted {
            attempts: 2,
            last_error: AttemptError::Transport(_),
        }
    ));
}

#[tokio::test]
async fn truncated_body_is_terminal_without_retry() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = connections.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promise 100 bytes, deliver 5, hang up.
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    let url = format!("http://{addr}/partial");
    let err = fast_fetcher().fetch_with_retry(&url, 3).await.unwrap_err();
    assert!(matches!(err, FetchError::BodyRead(_)), "got {err:?}");
    assert!(err.to_string().starts_with("error reading body: "));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

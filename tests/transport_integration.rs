//! Integration tests for the retrying HTTP client.

use std::time::{Duration, Instant};

use harvester_core::{FailureType, HttpClient, RetryPolicy, TransportError, classify_error};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn zero_wait(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO, 2.0)
}

/// Bind then drop a listener to get a port nobody answers on.
fn refused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_get_json_returns_body_and_sends_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(zero_wait(3)).unwrap();
    let url = Url::parse(&format!("{}/catalog", server.uri())).unwrap();
    let body = client.get_json(&url).await.unwrap();

    assert_eq!(body, br#"{"ok":true}"#);
}

#[tokio::test]
async fn test_multi_status_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(207).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = HttpClient::new(zero_wait(1)).unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    assert!(client.get_json(&url).await.is_ok());
}

#[tokio::test]
async fn test_server_error_is_returned_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(zero_wait(5)).unwrap();
    let url = Url::parse(&format!("{}/catalog", server.uri())).unwrap();
    let error = client.get_json(&url).await.unwrap_err();

    assert_eq!(error.status(), Some(503));
    assert_eq!(classify_error(&error), FailureType::Application);
}

#[tokio::test]
async fn test_connection_refused_is_retried_until_exhausted() {
    let port = refused_port();

    let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(20), 2.0);
    let client = HttpClient::new(policy).unwrap();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/catalog")).unwrap();

    let started = Instant::now();
    let error = client.get_json(&url).await.unwrap_err();

    assert!(
        matches!(error, TransportError::Network { .. }),
        "expected network error, got {error:?}"
    );
    assert_eq!(classify_error(&error), FailureType::Transient);
    // Two backoff sleeps of at least min_wait each.
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_refused_connection_with_tls_words_in_url_is_retried() {
    let port = refused_port();
    let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(20), 2.0);
    let client = HttpClient::new(policy).unwrap();
    let url = Url::parse(&format!(
        "http://127.0.0.1:{port}/catalog/RU%5CNLR%5Ctls12?query=ssl+handshake+certificate"
    ))
    .unwrap();

    let started = Instant::now();
    let error = client.get_json(&url).await.unwrap_err();

    assert!(
        matches!(error, TransportError::Network { .. }),
        "expected network error, got {error:?}"
    );
    assert_eq!(classify_error(&error), FailureType::Transient);
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn test_timed_out_attempt_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"slow":true}"#)
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_timeouts(
        zero_wait(3),
        Duration::from_secs(2),
        Duration::from_millis(300),
    )
    .unwrap();
    let url = Url::parse(&format!("{}/catalog", server.uri())).unwrap();
    let body = client.get_json(&url).await.unwrap();

    assert_eq!(body, br#"{"ok":true}"#);
}

#[tokio::test]
async fn test_single_attempt_policy_does_not_retry_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::with_timeouts(
        zero_wait(1),
        Duration::from_secs(2),
        Duration::from_millis(300),
    )
    .unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    let error = client.get_json(&url).await.unwrap_err();

    assert!(matches!(error, TransportError::Timeout { .. }), "got {error:?}");
}

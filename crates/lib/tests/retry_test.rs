//! Behavior of the bounded-retry HTTP wrapper.

use std::time::Duration;

use anyhow::Result;
use profsync::http::RetryClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn retry_client(max_attempts: u32) -> RetryClient {
    RetryClient::new(reqwest::Client::new(), max_attempts, Duration::ZERO)
}

#[tokio::test]
async fn persistent_server_error_is_attempted_exactly_max_times() -> Result<()> {
    // --- Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    let client = retry_client(3);

    // --- Act ---
    let request = client.client().get(format!("{}/flaky", server.uri()));
    let response = client.send(request).await;

    // --- Assert ---
    // The final response is surfaced so callers can log status and body.
    let response = response.expect("exhaustion on a status failure keeps the last response");
    assert_eq!(response.status(), 500);
    Ok(())
}

#[tokio::test]
async fn success_on_second_attempt_stops_retrying() -> Result<()> {
    // --- Arrange ---
    // The first mounted mock answers once with 500 and then expires, letting
    // the second one answer 200.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    let client = retry_client(3);

    // --- Act ---
    let request = client.client().get(format!("{}/recovering", server.uri()));
    let response = client.send(request).await;

    // --- Assert ---
    assert_eq!(response.unwrap().status(), 200);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    Ok(())
}

#[tokio::test]
async fn auth_failures_are_not_retried() -> Result<()> {
    // --- Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forbidden"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    let client = retry_client(3);

    // --- Act ---
    let request = client.client().get(format!("{}/forbidden", server.uri()));
    let response = client.send(request).await;

    // --- Assert ---
    assert_eq!(response.unwrap().status(), 403);
    Ok(())
}

#[tokio::test]
async fn throttling_status_is_retried_until_it_clears() -> Result<()> {
    // --- Arrange ---
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let client = retry_client(3);

    // --- Act ---
    let request = client.client().get(format!("{}/busy", server.uri()));
    let response = client.send(request).await;

    // --- Assert ---
    assert_eq!(response.unwrap().status(), 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn transport_exhaustion_returns_the_no_response_sentinel() {
    // Nothing listens on the discard port; every attempt dies at connect.
    let client = retry_client(2);
    let request = client.client().get("http://127.0.0.1:9/unreachable");
    let response = client.send(request).await;
    assert!(response.is_none());
}

//! Shared helpers for profsync integration tests: canned wiremock endpoints
//! for the faculty API and the Drupal REST interface, plus a ready-made
//! [`SyncConfig`] pointing at mock servers.

use profsync::SyncConfig;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_FACULTY_TOKEN: &str = "test-faculty-token";
pub const TEST_USERNAME: &str = "sync-bot";
pub const TEST_PASSWORD: &str = "hunter2";
pub const TEST_CONTENT_TYPE: &str = "faculty_profile";
pub const TEST_CSRF_TOKEN: &str = "test-csrf-token";
pub const TEST_SESSION_COOKIE: &str = "SESSd41d8cd9=abc123";

/// A `SyncConfig` wired to mock servers, with zero retry and throttle
/// delays so tests run at full speed.
pub fn test_config(faculty_url: &str, drupal_url: &str) -> SyncConfig {
    SyncConfig {
        faculty_api_url: faculty_url.to_string(),
        faculty_api_token: Some(TEST_FACULTY_TOKEN.to_string()),
        drupal_base_url: drupal_url.to_string(),
        drupal_username: Some(TEST_USERNAME.to_string()),
        drupal_password: Some(TEST_PASSWORD.to_string()),
        drupal_content_type: TEST_CONTENT_TYPE.to_string(),
        request_timeout_secs: 5,
        max_retries: 3,
        retry_delay_secs: 0,
        record_delay_secs: 0,
    }
}

/// Mounts the faculty endpoint, requiring the bearer token and returning
/// `records` verbatim.
pub async fn mount_faculty_records(server: &MockServer, records: Value) {
    Mock::given(method("GET"))
        .and(header("Authorization", format!("Bearer {TEST_FACULTY_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

/// Mounts a successful credential login that sets the test session cookie
/// and reports the logged-in account.
pub async fn mount_drupal_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({ "name": TEST_USERNAME, "pass": TEST_PASSWORD })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Set-Cookie",
                    format!("{TEST_SESSION_COOKIE}; path=/; HttpOnly").as_str(),
                )
                .set_body_json(json!({
                    "current_user": {
                        "uid": "12",
                        "name": TEST_USERNAME,
                        "roles": ["authenticated"]
                    },
                    "csrf_token": "login-embedded-token",
                    "logout_token": "logout-token"
                })),
        )
        .mount(server)
        .await;
}

/// Mounts the CSRF token endpoint, requiring the session cookie. The body
/// carries a trailing newline to exercise trimming.
pub async fn mount_session_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/rest/session/token"))
        .and(header("Cookie", TEST_SESSION_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{token}\n")))
        .mount(server)
        .await;
}

/// Mounts both authentication steps with the default test token.
pub async fn mount_drupal_auth(server: &MockServer) {
    mount_drupal_login(server).await;
    mount_session_token(server, TEST_CSRF_TOKEN).await;
}

/// Mounts node creation: requires the CSRF token, session cookie and
/// content type, answers 201 with the conventional identifier shape.
pub async fn mount_node_created(server: &MockServer, nid: &str) {
    Mock::given(method("POST"))
        .and(path("/node"))
        .and(header("X-CSRF-Token", TEST_CSRF_TOKEN))
        .and(header("Cookie", TEST_SESSION_COOKIE))
        .and(body_partial_json(json!({
            "type": [{ "target_id": TEST_CONTENT_TYPE }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "nid": [{ "value": nid }],
            "uuid": [{ "value": "b9f9e1ce-6f4f-4f2a-9f67-demo" }]
        })))
        .mount(server)
        .await;
}

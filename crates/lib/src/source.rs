//! Faculty180 source fetcher.
//!
//! One authenticated GET against the activity API. The wire payload is
//! loosely typed, so parsing stays on `serde_json::Value` until the records
//! are lifted into [`FacultyRecord`]; the required `name` field is enforced
//! later, at the mapping boundary.

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::http::{build_client, RetryClient};

const APP_USER_AGENT: &str = concat!("profsync/", env!("CARGO_PKG_VERSION"));

/// One faculty record as returned by the activity API.
///
/// Every field is optional here; records without a usable `name` are
/// rejected by the transformer, not at parse time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacultyRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
}

/// Client for the faculty endpoint.
pub struct FacultyClient {
    http: RetryClient,
    api_url: String,
    api_token: String,
}

impl FacultyClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            http: RetryClient::new(
                build_client(config.request_timeout()),
                config.max_retries,
                config.retry_delay(),
            ),
            api_url: config.faculty_api_url.clone(),
            api_token: config.faculty_api_token.clone().unwrap_or_default(),
        }
    }

    fn request(&self) -> reqwest::RequestBuilder {
        self.http
            .client()
            .get(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, APP_USER_AGENT)
    }

    /// Single authenticated GET, surfacing the raw response. Used by the
    /// connectivity diagnostic, which wants the status code and body as-is.
    pub async fn probe(&self) -> Result<Response, SyncError> {
        self.http
            .send(self.request())
            .await
            .ok_or_else(|| SyncError::Transport {
                operation: "faculty API fetch".to_string(),
            })
    }

    /// Fetches and parses the full record list.
    ///
    /// Any failure (transport, non-2xx status, malformed JSON) is
    /// downgraded to an empty list: the caller cannot distinguish "source
    /// down" from "legitimately zero records".
    pub async fn fetch(&self) -> Vec<FacultyRecord> {
        let response = match self.probe().await {
            Ok(response) => response,
            Err(err) => {
                warn!("faculty API fetch failed: {err}");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "faculty API returned a non-success status");
            return Vec::new();
        }

        let body: Value = match response.json().await {
            Ok(value) => value,
            Err(err) => {
                warn!("faculty API response was not valid JSON: {err}");
                return Vec::new();
            }
        };

        match parse_records(body) {
            Some(records) => {
                info!("fetched {} faculty records", records.len());
                records
            }
            None => {
                warn!("faculty API response had an unexpected shape");
                Vec::new()
            }
        }
    }
}

/// Lifts the wire value into records, tolerating an API that returns a
/// single object for a single-faculty query.
fn parse_records(value: Value) -> Option<Vec<FacultyRecord>> {
    let wrapped = match value {
        Value::Array(items) => Value::Array(items),
        object @ Value::Object(_) => Value::Array(vec![object]),
        _ => return None,
    };
    serde_json::from_value(wrapped).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_records_parses() {
        let records = parse_records(json!([
            { "name": "Jane Doe", "bio": "PhD" },
            { "name": "John Roe" }
        ]))
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(records[1].bio, None);
    }

    #[test]
    fn single_object_is_wrapped_into_one_record() {
        let records = parse_records(json!({ "name": "Solo Researcher" })).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Solo Researcher"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let records = parse_records(json!([
            { "name": "Jane Doe", "orcid": "0000-0001", "h_index": 42 }
        ]))
        .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn scalar_payload_is_rejected() {
        assert!(parse_records(json!("not records")).is_none());
        assert!(parse_records(json!(17)).is_none());
    }
}

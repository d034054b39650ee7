//! Drupal REST client: session authentication and node creation.
//!
//! Authentication is two dependent calls: a credential login that yields
//! the session cookies, then a token fetch that yields the CSRF token. Both
//! go through the retrying HTTP client; if either fails the caller must
//! abort the run, there is no partial-auth mode.

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::http::{build_client, RetryClient};
use crate::transform::NodePayload;

const CSRF_TOKEN_HEADER: &str = "X-CSRF-Token";
const BODY_SNIPPET_CHARS: usize = 200;

/// Cookies plus CSRF token authorizing node-creation calls for one run.
///
/// Established once, read-only afterwards. Expiry is not detected; a
/// mid-run expiry surfaces as a per-node rejection.
#[derive(Debug, Clone)]
pub struct DrupalSession {
    pub cookies: String,
    pub csrf_token: String,
}

/// The authenticated account as reported by the login response body.
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub uid: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Deserialize)]
struct LoginBody {
    current_user: Option<CurrentUser>,
}

/// Summary of a content type from the type-discovery endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ContentTypeInfo {
    #[serde(rename = "name")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub machine_name: Option<String>,
}

/// Client for the target site's REST interface.
pub struct DrupalClient {
    http: RetryClient,
    base_url: String,
    content_type: String,
}

impl DrupalClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            http: RetryClient::new(
                build_client(config.request_timeout()),
                config.max_retries,
                config.retry_delay(),
            ),
            base_url: config.drupal_base_url.trim_end_matches('/').to_string(),
            content_type: config.drupal_content_type.clone(),
        }
    }

    fn login_url(&self) -> String {
        format!("{}/user/login?_format=json", self.base_url)
    }

    fn token_url(&self) -> String {
        format!("{}/rest/session/token", self.base_url)
    }

    fn node_url(&self) -> String {
        format!("{}/node?_format=json", self.base_url)
    }

    fn type_url(&self) -> String {
        format!(
            "{}/rest/type/node/{}?_format=json",
            self.base_url, self.content_type
        )
    }

    /// GET against the site root, for reachability diagnostics.
    pub async fn site_status(&self) -> Result<StatusCode, SyncError> {
        let request = self.http.client().get(&self.base_url);
        let response = self
            .http
            .send(request)
            .await
            .ok_or_else(|| SyncError::Transport {
                operation: "site reachability check".to_string(),
            })?;
        Ok(response.status())
    }

    /// Step A: credential login.
    ///
    /// Returns the session cookie header value and, when the body can be
    /// parsed, the logged-in account. Body parsing is best-effort; the
    /// cookies are the part that matters.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(String, Option<CurrentUser>), SyncError> {
        let credentials = json!({ "name": username, "pass": password });
        let request = self
            .http
            .client()
            .post(self.login_url())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&credentials);

        let response = self
            .http
            .send(request)
            .await
            .ok_or_else(|| SyncError::Authentication("no response from the login endpoint".to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = snippet(&response.text().await.unwrap_or_default());
            return Err(SyncError::Authentication(format!(
                "login returned status {status}: {body}"
            )));
        }

        let cookies = cookie_header(&response);
        if cookies.is_empty() {
            return Err(SyncError::Authentication(
                "login response carried no session cookies".to_string(),
            ));
        }

        let account = response
            .json::<LoginBody>()
            .await
            .ok()
            .and_then(|body| body.current_user);
        Ok((cookies, account))
    }

    /// Step B: CSRF token fetch using the login cookies. The trimmed plain
    /// response body is the token.
    pub async fn session_token(&self, cookies: &str) -> Result<String, SyncError> {
        let request = self.http.client().get(self.token_url()).header(COOKIE, cookies);
        let response = self
            .http
            .send(request)
            .await
            .ok_or_else(|| SyncError::Authentication("no response from the token endpoint".to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SyncError::Authentication(format!(
                "token endpoint returned status {status}"
            )));
        }

        let token = response
            .text()
            .await
            .map_err(|err| SyncError::Authentication(format!("unreadable token body: {err}")))?;
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(SyncError::Authentication(
                "token endpoint returned an empty body".to_string(),
            ));
        }
        Ok(token)
    }

    /// Runs both authentication steps and assembles the session handle.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DrupalSession, SyncError> {
        let (cookies, account) = self.login(username, password).await?;
        if let Some(user) = account {
            info!(
                "logged in to Drupal as {} (uid {})",
                user.name.as_deref().unwrap_or("unknown"),
                user.uid.as_deref().unwrap_or("?")
            );
        }
        let csrf_token = self.session_token(&cookies).await?;
        Ok(DrupalSession { cookies, csrf_token })
    }

    /// Looks up the configured content type. `Ok(None)` means HTTP 404:
    /// the type does not exist on the target site.
    pub async fn content_type_info(
        &self,
        session: &DrupalSession,
    ) -> Result<Option<ContentTypeInfo>, SyncError> {
        let request = self
            .http
            .client()
            .get(self.type_url())
            .header(ACCEPT, "application/json")
            .header(CSRF_TOKEN_HEADER, &session.csrf_token)
            .header(COOKIE, &session.cookies);

        let response = self
            .http
            .send(request)
            .await
            .ok_or_else(|| SyncError::Transport {
                operation: "content type lookup".to_string(),
            })?;

        match response.status() {
            StatusCode::OK => Ok(Some(
                response.json::<ContentTypeInfo>().await.unwrap_or_default(),
            )),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = snippet(&response.text().await.unwrap_or_default());
                Err(SyncError::RemoteRejection {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// POSTs one node. Success is exactly HTTP 201.
    ///
    /// On success the created node id is extracted from the response body's
    /// conventional location; failing to find one is non-fatal, creation
    /// already succeeded.
    pub async fn create_node(
        &self,
        session: &DrupalSession,
        payload: &NodePayload,
    ) -> Result<Option<String>, SyncError> {
        let request = self
            .http
            .client()
            .post(self.node_url())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(CSRF_TOKEN_HEADER, &session.csrf_token)
            .header(COOKIE, &session.cookies)
            .json(payload);

        let response = self
            .http
            .send(request)
            .await
            .ok_or_else(|| SyncError::Transport {
                operation: "node creation".to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = snippet(&response.text().await.unwrap_or_default());
            return Err(SyncError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }

        let node_id = match response.json::<Value>().await {
            Ok(body) => parse_entity_id(&body),
            Err(err) => {
                warn!("node created but its response body was unreadable: {err}");
                None
            }
        };
        Ok(node_id)
    }
}

/// Extracts the created entity id from Drupal's conventional response shape:
/// an identifier array of one object with a `value` key (`nid[0].value`).
/// The value arrives as a string or an integer depending on site version.
pub fn parse_entity_id(body: &Value) -> Option<String> {
    match body.get("nid")?.get(0)?.get("value")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Joins the `name=value` pair of every `Set-Cookie` header into one
/// `Cookie` header value.
fn cookie_header(response: &Response) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    let mut short: String = trimmed.chars().take(BODY_SNIPPET_CHARS).collect();
    if short.len() < trimmed.len() {
        short.push_str("...");
    }
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_id_parses_string_and_integer_values() {
        assert_eq!(
            parse_entity_id(&json!({ "nid": [{ "value": "42" }] })),
            Some("42".to_string())
        );
        assert_eq!(
            parse_entity_id(&json!({ "nid": [{ "value": 42 }] })),
            Some("42".to_string())
        );
    }

    #[test]
    fn entity_id_is_absent_for_unconventional_bodies() {
        assert_eq!(parse_entity_id(&json!({})), None);
        assert_eq!(parse_entity_id(&json!({ "nid": [] })), None);
        assert_eq!(parse_entity_id(&json!({ "nid": [{}] })), None);
        assert_eq!(parse_entity_id(&json!({ "nid": [{ "value": null }] })), None);
    }

    #[test]
    fn long_bodies_are_snipped_for_logging() {
        let long = "x".repeat(500);
        let short = snippet(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), BODY_SNIPPET_CHARS + 3);
        assert_eq!(snippet("short body"), "short body");
    }
}

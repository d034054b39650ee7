//! Connectivity diagnostics: thin wrappers over the library clients that
//! print human-readable pass/fail lines for manual troubleshooting. No
//! machine-readable output format is promised.

use anyhow::{bail, Result};
use profsync::drupal::DrupalClient;
use profsync::source::FacultyClient;
use profsync::transform::NodePayload;
use profsync::SyncConfig;
use serde_json::Value;

const EXPECTED_FIELDS: [&str; 5] = ["name", "email", "department", "title", "bio"];

fn pass(message: &str) {
    println!("✅ {message}");
}

fn fail(message: &str) {
    println!("❌ {message}");
}

fn note(message: &str) {
    println!("   {message}");
}

/// Checks the Faculty180 side: configuration, authenticated reachability,
/// and the shape of whatever the endpoint returns.
pub async fn check_source(config: &SyncConfig) -> Result<()> {
    println!("Faculty180 API connection check");
    println!("--------------------------------");

    let Some(token) = config.faculty_api_token.as_deref() else {
        fail("FACULTY_API_TOKEN environment variable not set");
        note("export FACULTY_API_TOKEN='your_token_here'");
        bail!("configuration incomplete");
    };
    pass(&format!("API URL: {}", config.faculty_api_url));
    pass(&format!("API token: {}", mask_secret(token)));

    let client = FacultyClient::new(config);
    let response = match client.probe().await {
        Ok(response) => response,
        Err(err) => {
            fail(&format!("connection failed: {err}"));
            bail!("source verification failed");
        }
    };

    match response.status().as_u16() {
        200 => pass("API connection successful"),
        401 => {
            fail("authentication failed; check FACULTY_API_TOKEN");
            bail!("source verification failed");
        }
        403 => {
            fail("access forbidden; check API permissions");
            bail!("source verification failed");
        }
        404 => {
            fail("endpoint not found; check FACULTY_API_URL");
            bail!("source verification failed");
        }
        other => {
            fail(&format!("unexpected status code {other}"));
            bail!("source verification failed");
        }
    }

    let body: Value = match response.json().await {
        Ok(body) => body,
        Err(err) => {
            fail(&format!("response was not valid JSON: {err}"));
            bail!("source verification failed");
        }
    };
    analyze_source_body(&body);

    println!("Source verification completed.");
    Ok(())
}

fn analyze_source_body(body: &Value) {
    match body {
        Value::Array(items) => {
            pass(&format!("response contains {} faculty records", items.len()));
            if let Some(Value::Object(sample)) = items.first() {
                note(&format!(
                    "sample record keys: {}",
                    sample.keys().cloned().collect::<Vec<_>>().join(", ")
                ));
                report_expected_fields(sample);
            }
        }
        Value::Object(record) => {
            pass("response is a single record object");
            note(&format!(
                "record keys: {}",
                record.keys().cloned().collect::<Vec<_>>().join(", ")
            ));
            report_expected_fields(record);
        }
        _ => fail("response is neither a list nor an object"),
    }
}

fn report_expected_fields(record: &serde_json::Map<String, Value>) {
    let found: Vec<&str> = EXPECTED_FIELDS
        .iter()
        .copied()
        .filter(|field| record.contains_key(*field))
        .collect();
    let missing: Vec<&str> = EXPECTED_FIELDS
        .iter()
        .copied()
        .filter(|field| !record.contains_key(*field))
        .collect();
    if !found.is_empty() {
        pass(&format!("found expected fields: {}", found.join(", ")));
    }
    if !missing.is_empty() {
        note(&format!("missing common fields: {}", missing.join(", ")));
    }
}

/// Checks the Drupal side: configuration, site reachability, login, CSRF
/// token, content-type existence, and a live (unpublished) test node.
///
/// The first four checks are fatal; the last two are reported but leave the
/// exit code untouched, matching the behavior of the manual script this
/// replaces.
pub async fn check_target(config: &SyncConfig) -> Result<()> {
    println!("Drupal REST API connection check");
    println!("--------------------------------");

    let mut missing = Vec::new();
    if config.drupal_username.is_none() {
        missing.push("DRUPAL_USERNAME");
    }
    if config.drupal_password.is_none() {
        missing.push("DRUPAL_PASSWORD");
    }
    if !missing.is_empty() {
        fail(&format!("missing environment variables: {}", missing.join(", ")));
        for name in missing {
            note(&format!("export {name}='your_value_here'"));
        }
        bail!("configuration incomplete");
    }
    let username = config.drupal_username.as_deref().unwrap_or_default();
    let password = config.drupal_password.as_deref().unwrap_or_default();
    pass(&format!("base URL: {}", config.drupal_base_url));
    pass(&format!("username: {username}"));
    pass(&format!("password: {}", mask_secret(password)));
    pass(&format!("content type: {}", config.drupal_content_type));

    let drupal = DrupalClient::new(config);

    match drupal.site_status().await {
        Ok(status) if status.is_success() => pass("Drupal site is accessible"),
        Ok(status) => {
            fail(&format!("site responded with status {status}"));
            bail!("target verification failed");
        }
        Err(err) => {
            fail(&format!("site unreachable: {err}"));
            bail!("target verification failed");
        }
    }

    let session = match drupal.authenticate(username, password).await {
        Ok(session) => {
            pass("login and CSRF token retrieval succeeded");
            session
        }
        Err(err) => {
            fail(&err.to_string());
            bail!("target verification failed");
        }
    };
    note(&format!("token preview: {}", token_preview(&session.csrf_token)));

    match drupal.content_type_info(&session).await {
        Ok(Some(info)) => {
            pass(&format!(
                "content type '{}' is accessible",
                config.drupal_content_type
            ));
            if let Some(label) = info.label {
                note(&format!("label: {label}"));
            }
            if let Some(machine_name) = info.machine_name {
                note(&format!("machine name: {machine_name}"));
            }
        }
        Ok(None) => fail(&format!(
            "content type '{}' not found",
            config.drupal_content_type
        )),
        Err(err) => fail(&format!("content type check failed: {err}")),
    }

    // This creates a real node on the target, deliberately unpublished.
    let probe_node = NodePayload::new(
        &config.drupal_content_type,
        "TEST - Connection Verification",
        false,
    );
    match drupal.create_node(&session, &probe_node).await {
        Ok(Some(node_id)) => {
            pass("node creation successful");
            note(&format!("created test node {node_id}; you may want to delete it"));
        }
        Ok(None) => pass("node creation successful (no id in response body)"),
        Err(err) => fail(&format!("node creation failed: {err}")),
    }

    println!("Target verification completed.");
    Ok(())
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    let tail: String = secret.chars().skip(count.saturating_sub(4)).collect();
    format!("{}...{tail}", "*".repeat(20))
}

fn token_preview(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 30 {
        return token.to_string();
    }
    let head: String = chars[..20].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tokens_are_previewed_verbatim() {
        assert_eq!(token_preview("tok-123"), "tok-123");
    }

    #[test]
    fn long_tokens_are_elided_in_the_middle() {
        let token = "a".repeat(64);
        let preview = token_preview(&token);
        assert_eq!(preview.len(), 20 + 3 + 10);
        assert!(preview.contains("..."));
    }

    #[test]
    fn masked_secrets_keep_only_a_short_tail() {
        let masked = mask_secret("super-secret-value");
        assert!(masked.starts_with("********************"));
        assert!(masked.ends_with("alue"));
        assert!(!masked.contains("super"));
    }
}

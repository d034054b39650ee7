//! Connection parameters for the source API and the Drupal target.
//!
//! All values come from the process environment, read once into an explicit
//! [`SyncConfig`] that is passed into every component. Endpoint URLs and the
//! content type carry documented defaults; secrets never do.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::errors::SyncError;

pub const DEFAULT_FACULTY_API_URL: &str = "https://api.faculty180.com/v1/faculty";
pub const DEFAULT_DRUPAL_BASE_URL: &str = "https://yoursite.com";
pub const DEFAULT_CONTENT_TYPE: &str = "faculty_profile";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
const DEFAULT_RECORD_DELAY_SECS: u64 = 1;

/// Everything one run needs to talk to both systems.
///
/// Secrets stay `Option` so that [`SyncConfig::missing`] can report every
/// absent value by name; callers must run [`SyncConfig::validate`] before
/// touching the network.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub faculty_api_url: String,
    pub faculty_api_token: Option<String>,
    pub drupal_base_url: String,
    pub drupal_username: Option<String>,
    pub drupal_password: Option<String>,
    pub drupal_content_type: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    pub record_delay_secs: u64,
}

impl SyncConfig {
    /// Reads the configuration from the environment. No validation happens
    /// here; unset or empty secrets surface through [`SyncConfig::missing`].
    pub fn from_env() -> Self {
        Self {
            faculty_api_url: string_env("FACULTY_API_URL", DEFAULT_FACULTY_API_URL),
            faculty_api_token: secret_env("FACULTY_API_TOKEN"),
            drupal_base_url: string_env("DRUPAL_BASE_URL", DEFAULT_DRUPAL_BASE_URL),
            drupal_username: secret_env("DRUPAL_USERNAME"),
            drupal_password: secret_env("DRUPAL_PASSWORD"),
            drupal_content_type: string_env("DRUPAL_CONTENT_TYPE", DEFAULT_CONTENT_TYPE),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: parse_env("MAX_RETRIES", DEFAULT_MAX_RETRIES),
            retry_delay_secs: parse_env("RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS),
            record_delay_secs: parse_env("RECORD_DELAY_SECS", DEFAULT_RECORD_DELAY_SECS),
        }
    }

    /// Names of every required value that is absent, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.faculty_api_token.is_none() {
            missing.push("FACULTY_API_TOKEN");
        }
        if self.drupal_username.is_none() {
            missing.push("DRUPAL_USERNAME");
        }
        if self.drupal_password.is_none() {
            missing.push("DRUPAL_PASSWORD");
        }
        missing
    }

    /// Fails with [`SyncError::MissingConfig`] listing every absent secret.
    pub fn validate(&self) -> Result<(), SyncError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SyncError::MissingConfig(
                missing.into_iter().map(String::from).collect(),
            ))
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn record_delay(&self) -> Duration {
        Duration::from_secs(self.record_delay_secs)
    }
}

fn string_env(key: &str, default: &str) -> String {
    match secret_env(key) {
        Some(value) => value,
        None => default.to_string(),
    }
}

/// Treats an empty or whitespace-only value as unset.
fn secret_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring unparsable value for {key}: {raw:?}");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_KEYS: [&str; 10] = [
        "FACULTY_API_URL",
        "FACULTY_API_TOKEN",
        "DRUPAL_BASE_URL",
        "DRUPAL_USERNAME",
        "DRUPAL_PASSWORD",
        "DRUPAL_CONTENT_TYPE",
        "REQUEST_TIMEOUT",
        "MAX_RETRIES",
        "RETRY_DELAY_SECS",
        "RECORD_DELAY_SECS",
    ];

    fn clear_env() {
        for key in ALL_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_environment_is_empty() {
        clear_env();
        let config = SyncConfig::from_env();
        assert_eq!(config.faculty_api_url, DEFAULT_FACULTY_API_URL);
        assert_eq!(config.drupal_base_url, DEFAULT_DRUPAL_BASE_URL);
        assert_eq!(config.drupal_content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_secs, 2);
        assert_eq!(config.record_delay_secs, 1);
    }

    #[test]
    #[serial]
    fn missing_lists_every_absent_secret_by_name() {
        clear_env();
        let config = SyncConfig::from_env();
        assert_eq!(
            config.missing(),
            vec!["FACULTY_API_TOKEN", "DRUPAL_USERNAME", "DRUPAL_PASSWORD"]
        );
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SyncError::MissingConfig(ref names) if names.len() == 3));
    }

    #[test]
    #[serial]
    fn empty_secret_counts_as_missing() {
        clear_env();
        env::set_var("FACULTY_API_TOKEN", "   ");
        env::set_var("DRUPAL_USERNAME", "editor");
        env::set_var("DRUPAL_PASSWORD", "s3cret");
        let config = SyncConfig::from_env();
        assert_eq!(config.missing(), vec!["FACULTY_API_TOKEN"]);
        clear_env();
    }

    #[test]
    #[serial]
    fn complete_environment_validates() {
        clear_env();
        env::set_var("FACULTY_API_TOKEN", "tok");
        env::set_var("DRUPAL_USERNAME", "editor");
        env::set_var("DRUPAL_PASSWORD", "s3cret");
        env::set_var("DRUPAL_CONTENT_TYPE", "staff_profile");
        env::set_var("MAX_RETRIES", "5");
        let config = SyncConfig::from_env();
        assert!(config.validate().is_ok());
        assert_eq!(config.drupal_content_type, "staff_profile");
        assert_eq!(config.max_retries, 5);
        clear_env();
    }

    #[test]
    #[serial]
    fn unparsable_numbers_fall_back_to_defaults() {
        clear_env();
        env::set_var("MAX_RETRIES", "many");
        env::set_var("RETRY_DELAY_SECS", "-1");
        let config = SyncConfig::from_env();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_secs, 2);
        clear_env();
    }
}

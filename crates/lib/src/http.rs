//! Bounded-retry wrapper around outbound HTTP calls.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use tracing::warn;

/// Wraps a [`reqwest::Client`] with a fixed-delay, bounded retry policy.
///
/// Transport errors and HTTP 5xx/408/429 responses are retried up to the
/// configured number of attempts, sleeping a fixed delay in between. Other
/// non-2xx statuses are handed back on the first attempt; a 401 does not
/// burn retry budget. `None` from [`RetryClient::send`] means no response
/// was obtained at all, and callers treat it as a hard failure for the
/// current item.
#[derive(Debug, Clone)]
pub struct RetryClient {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryClient {
    pub fn new(client: Client, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// The underlying client, for building requests that will be passed back
    /// into [`RetryClient::send`].
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends `request`, replaying it on retriable failures.
    ///
    /// Returns the final response (successful, non-retriable, or the last
    /// retriable one after exhaustion), or `None` when every attempt died
    /// at the transport level.
    pub async fn send(&self, request: RequestBuilder) -> Option<Response> {
        if request.try_clone().is_none() {
            warn!("request body cannot be replayed; sending a single attempt");
            return request.send().await.ok();
        }

        for attempt in 1..=self.max_attempts {
            let req = request.try_clone()?;
            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success()
                        || !is_retriable_status(status)
                        || attempt == self.max_attempts
                    {
                        return Some(response);
                    }
                    warn!(%status, attempt, max = self.max_attempts, "retriable response status");
                }
                Err(err) => {
                    warn!(attempt, max = self.max_attempts, "request failed: {err}");
                    if attempt == self.max_attempts {
                        return None;
                    }
                }
            }
            sleep(self.retry_delay).await;
        }
        None
    }
}

/// Builds the shared HTTP client with the configured request timeout.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn is_retriable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retriable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retriable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(is_retriable_status(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retriable_status(StatusCode::FORBIDDEN));
        assert!(!is_retriable_status(StatusCode::NOT_FOUND));
        assert!(!is_retriable_status(StatusCode::UNPROCESSABLE_ENTITY));
    }
}

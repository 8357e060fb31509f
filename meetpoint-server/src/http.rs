//! Shared HTTP plumbing for outbound clients.
//!
//! Every external call goes through a client with an explicit timeout and a
//! bounded retry budget. Only failures that may succeed on a second attempt
//! are retried: connection errors, timeouts, 5xx and 429 responses.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRIES: u32 = 2;

/// Default delay between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 250;

/// Timeout and retry budget for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after the first one
    pub retries: u32,
    /// Fixed pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retries: DEFAULT_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Build a `reqwest::Client` with this timeout and the given default headers.
    pub fn build_client(&self, headers: HeaderMap) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout())
            .build()
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Send a request, retrying transient failures within the budget.
///
/// `build` is called once per attempt because a `RequestBuilder` is
/// consumed by `send`. The last response or error is returned as-is, so a
/// 5xx that survives every retry still reaches the caller's status handling.
pub async fn send_with_retry<F>(
    settings: &HttpSettings,
    label: &str,
    build: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        let result = build().send().await;

        let retryable = match &result {
            Ok(response) => is_retryable_status(response.status()),
            Err(err) => is_retryable_error(err),
        };

        if !retryable || attempt >= settings.retries {
            return result;
        }

        attempt += 1;
        match &result {
            Ok(response) => debug!(
                client = label,
                attempt,
                status = response.status().as_u16(),
                "retrying request"
            ),
            Err(err) => debug!(client = label, attempt, error = %err, "retrying request"),
        }
        tokio::time::sleep(settings.retry_delay()).await;
    }
}

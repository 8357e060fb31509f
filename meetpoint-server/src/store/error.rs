//! Record store error types.

use reqwest::{Response, StatusCode};

/// Errors from the event record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store returned an error status
    #[error("store error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON shape we expect
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No event with this id
    #[error("event {0} not found")]
    NotFound(String),

    /// The event is not in the status the transition expects
    #[error("event {0} is already being finalized")]
    Conflict(String),

    /// The service key cannot be sent as a header value
    #[error("invalid service key format")]
    InvalidKey,

    /// Injected failure (in-memory store only)
    #[error("store unavailable: {0}")]
    Unavailable(&'static str),
}

impl StoreError {
    pub(crate) async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: if status == StatusCode::UNAUTHORIZED {
                "service key rejected".to_string()
            } else {
                body.chars().take(500).collect()
            },
        })
    }

    pub(crate) fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, StoreError> {
        serde_json::from_str(body).map_err(|e| StoreError::Json {
            message: format!(
                "{e} (body: {})",
                body.chars().take(200).collect::<String>()
            ),
        })
    }
}

//! Provider client error types.

use reqwest::{Response, StatusCode};

/// Errors from an external data provider.
///
/// These never abort finalization; the calling stage converts them into
/// its fallback value and keeps the error alongside it for reporting.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credentials rejected by the provider
    #[error("unauthorized: check the provider API key")]
    Unauthorized,

    /// Rate limited by the provider
    #[error("rate limited by provider")]
    RateLimited,

    /// Provider returned an error status or an in-band error object
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the JSON shape we expect
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The API key cannot be sent as a header value
    #[error("invalid API key format")]
    InvalidKey,
}

impl ProviderError {
    /// Map a non-success response to an error, passing successes through.
    pub(crate) async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        Ok(response)
    }

    /// Decode a JSON body, keeping a short excerpt of the body on failure.
    pub(crate) fn parse<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
        serde_json::from_str(body).map_err(|e| ProviderError::Json {
            message: format!(
                "{e} (body: {})",
                body.chars().take(200).collect::<String>()
            ),
        })
    }
}

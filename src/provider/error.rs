use std::time::Duration;
use thiserror::Error;

/// A request for one fetch window failed. The synchronizer records it and moves on.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {request} with status {status}")]
    HttpStatus {
        request: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limit reached for {request}: {message}")]
    RateLimited { request: String, message: String },

    #[error("Provider returned an error for {request}: {message}")]
    Api { request: String, message: String },

    #[error("Failed to decode provider response")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The remote object does not exist. This is a distinguished, recoverable
    /// outcome: reads map it to absence and destroy checks accept it.
    #[error("{code}: {message}")]
    NotFound { code: String, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Authentication failed")]
    Auth,

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Timeout waiting for {resource} after {seconds}s")]
    WaitTimeout { resource: String, seconds: u64 },

    #[error("Wait for {resource} cancelled")]
    Cancelled { resource: String },
}

impl ApiError {
    /// True for the not-found classification; every other error propagates
    /// verbatim to the caller.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

use thiserror::Error;

/// Failure while fetching a data set from the service
#[derive(Error, Debug)]
pub enum FetchError {
    /// Non-success, non-429 response. Never retried.
    #[error("HTTP {status} on {endpoint} page {page}: {body}")]
    Http {
        endpoint: String,
        page: u32,
        status: u16,
        body: String,
    },

    /// Still rate limited after the last allowed attempt
    #[error("Rate limited on {endpoint} page {page}, gave up after {attempts} attempts")]
    RateLimitExceeded {
        endpoint: String,
        page: u32,
        attempts: u32,
    },

    #[error("Request for {endpoint} page {page} failed: {source}")]
    Transport {
        endpoint: String,
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Response for {endpoint} page {page} is not valid JSON: {message}")]
    Decode {
        endpoint: String,
        page: u32,
        message: String,
    },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_http(&self) -> bool {
        matches!(self, FetchError::Http { .. })
    }
}

use thiserror::Error;

/// Errors that can occur while talking to a remote config provider.
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    #[error("Remote config is not configured: {0}")]
    NotConfigured(String),

    #[error("Remote config returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse remote config response: {0}")]
    ParseError(String),

    #[error("Remote config fetch throttled. Try again later.")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for RemoteConfigError {
    fn from(err: reqwest::Error) -> Self {
        RemoteConfigError::Network(err.to_string())
    }
}

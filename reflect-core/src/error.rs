use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReflectError {
    #[error("{0}")]
    Validation(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("An analysis is still being generated for the last reflection")]
    PollInProgress,

    #[error("All {attempts} retry attempts failed: {last}")]
    RetryExhausted { attempts: usize, last: Box<ReflectError> },
}

impl ReflectError {
    /// Transient failures worth retrying on idempotent requests.
    pub fn is_transient(&self) -> bool {
        match self {
            ReflectError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ReflectError::Backend { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReflectError>;

use thiserror::Error;

/// Failure talking to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("API key variable {0} is not set")]
    MissingApiKey(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::MissingApiKey(_) | Self::Malformed(_) => false,
        }
    }
}

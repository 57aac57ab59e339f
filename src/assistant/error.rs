use thiserror::Error;

/// Failures talking to the voice-assistant service.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid service url: {0}")]
    InvalidUrl(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("request aborted")]
    Aborted,
}

impl AssistantError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AssistantError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

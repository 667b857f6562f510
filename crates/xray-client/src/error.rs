//! Prediction client error types.

use thiserror::Error;
use xray_models::TransitionError;

pub type ClientResult<T> = Result<T, PredictionError>;

/// Everything that can end a submission without a prediction.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Couldn't read image: {0}")]
    Decode(String),

    #[error("Couldn't create temp file: {0}")]
    Encode(String),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error: {status_code}")]
    Server {
        status_code: u16,
        message: Option<String>,
    },

    #[error("Empty response from server")]
    EmptyResponse,

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Submission cancelled")]
    Cancelled,

    #[error("Action not available: {0}")]
    InvalidState(#[from] TransitionError),
}

impl PredictionError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PredictionError::Server { status_code, .. } => Some(*status_code),
            PredictionError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short, stable name used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::Decode(_) => "decode",
            PredictionError::Encode(_) => "encode",
            PredictionError::Transport(_) => "transport",
            PredictionError::Server { .. } => "server",
            PredictionError::EmptyResponse => "empty_response",
            PredictionError::MalformedResponse(_) => "malformed_response",
            PredictionError::InvalidConfig(_) => "invalid_config",
            PredictionError::Cancelled => "cancelled",
            PredictionError::InvalidState(_) => "invalid_state",
        }
    }

    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PredictionError::Server {
                status_code,
                message: Some(message),
            } => format!("Error: Server error: {} ({})", status_code, message),
            PredictionError::Transport(e) if e.is_timeout() => {
                "Error: The prediction service did not respond in time".to_string()
            }
            PredictionError::Transport(e) if e.is_connect() => {
                "Error: Couldn't reach the prediction service".to_string()
            }
            other => format!("Error: {}", other),
        }
    }
}

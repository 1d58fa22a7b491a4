//! Error types for the deployment receiver

use thiserror::Error;

/// Main error type for the deployment receiver
#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Notification error: {0}")]
    NotifyError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ReceiverError {
    fn from(err: anyhow::Error) -> Self {
        ReceiverError::Internal(err.to_string())
    }
}

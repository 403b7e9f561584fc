//! Error types for Scout

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for Scout operations
///
/// Search provider failures never show up here: the augmenter folds them
/// into its result string. Only LLM provider faults cross the request
/// boundary as errors.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Configuration errors (missing credentials, bad listen address, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The inbound chat request failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The LLM provider call failed (network, auth, malformed response)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Failure while consuming a provider stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl ScoutError {
    /// HTTP status and error type tag used when this error reaches a client
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ScoutError::InvalidRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_request"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ScoutError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        let message = match &self {
            ScoutError::Provider(detail) | ScoutError::InvalidRequest(detail) => detail.clone(),
            other => other.to_string(),
        };

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            error_message = %message,
            "Request failed"
        );

        let body = serde_json::json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(e: serde_json::Error) -> Self {
        ScoutError::Serialization(e.to_string())
    }
}

/// Result type alias for Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Failure surfaced by a single studio operation.
///
/// None of these are fatal: the studio keeps its previous snapshot and shows
/// the message to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudioError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    RequestFailure(String),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("another action is still running")]
    Busy,
}

impl StudioError {
    pub fn missing_project_path() -> Self {
        Self::Validation("Project path is required.".to_string())
    }

    /// Text shown in the toast when the error reaches the user.
    pub fn user_message(&self) -> String {
        match self {
            StudioError::Clipboard(_) => "Clipboard copy failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Payload(serde_json::Error),
    Studio(StudioError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Payload(err) => write!(f, "malformed payload: {}", err),
            AppError::Studio(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Payload(err) => Some(err),
            AppError::Studio(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Studio(StudioError::Validation(_))
            | AppError::Studio(StudioError::UnknownAction(_))
            | AppError::Payload(_) => StatusCode::BAD_REQUEST,
            AppError::Studio(StudioError::Busy) => StatusCode::CONFLICT,
            AppError::Studio(StudioError::RequestFailure(_)) => StatusCode::BAD_GATEWAY,
            AppError::Studio(StudioError::Clipboard(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

impl From<StudioError> for AppError {
    fn from(value: StudioError) -> Self {
        Self::Studio(value)
    }
}

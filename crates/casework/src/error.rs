use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::applicants::ImportError;
use crate::workflows::duplicates::{FinderError, MergeError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Import(ImportError),
    Finder(FinderError),
    Merge(MergeError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Finder(err) => write!(f, "duplicate scan error: {}", err),
            AppError::Merge(err) => write!(f, "merge error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Finder(err) => Some(err),
            AppError::Merge(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Finder(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Merge(MergeError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Merge(MergeError::DuplicateNotFound(_) | MergeError::MasterNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Merge(MergeError::Busy(_)) => StatusCode::CONFLICT,
            AppError::Merge(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<FinderError> for AppError {
    fn from(value: FinderError) -> Self {
        Self::Finder(value)
    }
}

impl From<MergeError> for AppError {
    fn from(value: MergeError) -> Self {
        Self::Merge(value)
    }
}

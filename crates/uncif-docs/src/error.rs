use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::documents::{ExportError, UnknownVariant};
use crate::workflows::fees::FeeInputError;
use crate::workflows::grants::GrantCatalogError;
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
    Server(axum::Error),
    Grants(GrantCatalogError),
    Export(ExportError),
    Fee(FeeInputError),
    Input(UnknownVariant),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Grants(err) => write!(f, "grants catalog error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Fee(err) => write!(f, "fee error: {}", err),
            AppError::Input(err) => write!(f, "invalid input: {}", err),
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
            AppError::Grants(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Fee(err) => Some(err),
            AppError::Input(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Input(_) => StatusCode::BAD_REQUEST,
            AppError::Fee(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(ExportError::Busy) => StatusCode::CONFLICT,
            AppError::Export(ExportError::Unsupported { .. }) => StatusCode::NOT_IMPLEMENTED,
            AppError::Export(ExportError::Generate(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Grants(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<GrantCatalogError> for AppError {
    fn from(value: GrantCatalogError) -> Self {
        Self::Grants(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<FeeInputError> for AppError {
    fn from(value: FeeInputError) -> Self {
        Self::Fee(value)
    }
}

impl From<UnknownVariant> for AppError {
    fn from(value: UnknownVariant) -> Self {
        Self::Input(value)
    }
}

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{DocumentKind, ExportFormat, FormData};
use super::export::{ArtifactSink, Delivery, ExportError, ExportNotifier};
use super::generator::GenerateError;
use super::service::DocumentService;

/// Largest accepted request body.
pub const MAX_REQUEST_BYTES: usize = 256 * 1024;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocumentRequest {
    #[serde(default)]
    pub fields: FormData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    pub format: Option<String>,
}

/// Catalog, preview, export and notice endpoints.
pub fn document_router<S, N>(service: Arc<DocumentService<S, N>>) -> Router
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    Router::new()
        .route("/api/v1/documents", get(catalog_handler::<S, N>))
        .route("/api/v1/documents/notices", get(notices_handler::<S, N>))
        .route(
            "/api/v1/documents/:kind/preview",
            post(preview_handler::<S, N>),
        )
        .route(
            "/api/v1/documents/:kind/export",
            post(export_handler::<S, N>),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(service)
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn parse_kind(raw: &str) -> Result<DocumentKind, Response> {
    raw.parse::<DocumentKind>()
        .map_err(|err| error_response(StatusCode::NOT_FOUND, err.to_string()))
}

pub(crate) async fn catalog_handler<S, N>(
    State(service): State<Arc<DocumentService<S, N>>>,
) -> Response
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog())).into_response()
}

pub(crate) async fn notices_handler<S, N>(
    State(service): State<Arc<DocumentService<S, N>>>,
) -> Response
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    let notices = service.pipeline().notifier().recent();
    (StatusCode::OK, axum::Json(notices)).into_response()
}

pub(crate) async fn preview_handler<S, N>(
    State(service): State<Arc<DocumentService<S, N>>>,
    Path(kind): Path<String>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match service.preview(kind, &request.fields, Utc::now().date_naive()) {
        Ok(preview) => (StatusCode::OK, axum::Json(preview)).into_response(),
        Err(GenerateError::Validation(error)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        Err(other) => error_response(StatusCode::NOT_FOUND, other.to_string()),
    }
}

pub(crate) async fn export_handler<S, N>(
    State(service): State<Arc<DocumentService<S, N>>>,
    Path(kind): Path<String>,
    Query(query): Query<ExportQuery>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    S: ArtifactSink + 'static,
    N: ExportNotifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let format = match query.format.as_deref() {
        None => ExportFormat::Pdf,
        Some(raw) => match raw.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(err) => return error_response(StatusCode::BAD_REQUEST, err.to_string()),
        },
    };

    // Rendering blocks; it runs on the blocking pool.
    let exported = tokio::task::spawn_blocking(move || {
        service.export(kind, format, request.fields, Utc::now())
    })
    .await;
    let result = match exported {
        Ok(result) => result,
        Err(error) => {
            tracing::error!(kind = %kind, error = %error, "export task did not complete");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export task did not complete".to_string(),
            );
        }
    };

    match result {
        Ok(receipt) => match receipt.delivery {
            Delivery::Download(artifact) => {
                let headers = [
                    (header::CONTENT_TYPE, artifact.content_type.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", artifact.file_name),
                    ),
                ];
                (StatusCode::OK, headers, artifact.bytes).into_response()
            }
            Delivery::Written(path) => {
                let payload = json!({
                    "file_name": receipt.file_name,
                    "bytes": receipt.size,
                    "location": path.display().to_string(),
                });
                (StatusCode::CREATED, axum::Json(payload)).into_response()
            }
        },
        Err(error) => {
            let status = match &error {
                ExportError::Busy => StatusCode::CONFLICT,
                ExportError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
                ExportError::Generate(GenerateError::Validation(_)) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ExportError::Generate(GenerateError::UnknownTemplate(_)) => StatusCode::NOT_FOUND,
                ExportError::Encode(_) | ExportError::Delivery(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            error_response(status, error.to_string())
        }
    }
}

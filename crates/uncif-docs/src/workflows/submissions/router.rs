use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{
    DonationForm, GrantApplicationForm, OfficeRegistrationForm, SubmissionId, SubmissionRecord,
};
use super::repository::{RepositoryError, SubmissionRepository};
use super::service::{SubmissionService, SubmissionServiceError};

/// Intake endpoints for donations, office registrations and grant applications.
pub fn submission_router<R>(service: Arc<SubmissionService<R>>) -> Router
where
    R: SubmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/donations", post(donation_handler::<R>))
        .route("/api/v1/offices", post(office_handler::<R>))
        .route("/api/v1/grant-applications", post(grant_handler::<R>))
        .route("/api/v1/submissions/:submission_id", get(fetch_handler::<R>))
        .with_state(service)
}

fn accepted(result: Result<SubmissionRecord, SubmissionServiceError>) -> Response {
    match result {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.receipt())).into_response(),
        Err(SubmissionServiceError::Validation(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmissionServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "submission already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn donation_handler<R>(
    State(service): State<Arc<SubmissionService<R>>>,
    axum::Json(form): axum::Json<DonationForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    accepted(service.submit_donation(form))
}

pub(crate) async fn office_handler<R>(
    State(service): State<Arc<SubmissionService<R>>>,
    axum::Json(form): axum::Json<OfficeRegistrationForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    accepted(service.register_office(form))
}

pub(crate) async fn grant_handler<R>(
    State(service): State<Arc<SubmissionService<R>>>,
    axum::Json(form): axum::Json<GrantApplicationForm>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    accepted(service.apply_for_grant(form))
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<SubmissionService<R>>>,
    Path(submission_id): Path<String>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let id = SubmissionId(submission_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.receipt())).into_response(),
        Err(SubmissionServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": format!("submission {id} not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::{GrantDirectory, GrantQuery};

pub fn grant_router(directory: Arc<GrantDirectory>) -> Router {
    Router::new()
        .route("/api/v1/grants", get(list_handler))
        .with_state(directory)
}

pub(crate) async fn list_handler(
    State(directory): State<Arc<GrantDirectory>>,
    Query(query): Query<GrantQuery>,
) -> Response {
    (StatusCode::OK, axum::Json(directory.search(&query))).into_response()
}

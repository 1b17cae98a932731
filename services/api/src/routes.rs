use crate::infra::{AppServices, AppState};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use uncif_docs::workflows::documents::{document_router, MAX_REQUEST_BYTES};
use uncif_docs::workflows::fees::fee_router;
use uncif_docs::workflows::grants::grant_router;
use uncif_docs::workflows::submissions::submission_router;

/// Every workflow router plus the operational endpoints.
pub(crate) fn app_router(services: &AppServices) -> Router {
    fee_router(Arc::clone(&services.calculator))
        .merge(document_router(Arc::clone(&services.documents)))
        .merge(submission_router(Arc::clone(&services.submissions)))
        .merge(grant_router(Arc::clone(&services.grants)))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;
    use uncif_docs::config::{
        AppConfig, AppEnvironment, ExportSettings, ServerConfig, TelemetryConfig,
    };
    use uncif_docs::workflows::fees::FeeSchedule;

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            fees: FeeSchedule::default(),
            export: ExportSettings {
                raster_scale: 1,
                ..ExportSettings::default()
            },
        }
    }

    fn app(ready: bool) -> (Router, Arc<AtomicBool>) {
        let services = AppServices::from_config(&config()).expect("services build");
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: Arc::clone(&readiness),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        (app_router(&services).layer(Extension(state)), readiness)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        let (router, readiness) = app(false);
        let response = router
            .clone()
            .oneshot(get_request("/ready"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        readiness.store(true, Ordering::Release);
        let response = router.oneshot(get_request("/ready")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_fee_quote_share_one_router() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(get_request("/health"))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["status"], "ok");

        let response = router
            .oneshot(json_request(
                "POST",
                "/api/v1/fees/quote",
                json!({ "page_count": 3, "category": "regular" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["editing_fee"], 700);
        assert_eq!(payload["applicant_total"], 140);
    }

    #[tokio::test]
    async fn donation_round_trip_through_submission_lookup() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/donations",
                json!({
                    "donor_name": "Anita Desai",
                    "email": "anita@example.org",
                    "amount": 1500,
                    "recurring": false,
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let receipt = json_body(response).await;
        assert_eq!(receipt["id"], "don-000001");
        assert_eq!(receipt["kind"], "donation");

        let response = router
            .clone()
            .oneshot(get_request("/api/v1/submissions/don-000001"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(get_request("/api/v1/submissions/don-000404"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_office_registration_is_unprocessable() {
        let (router, _) = app(true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/api/v1/offices",
                json!({
                    "office_name": "UNCIF Kochi",
                    "contact_person": "",
                    "email": "kochi@uncif.org",
                    "phone": "0484 255 0101",
                    "city": "Kochi",
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = json_body(response).await;
        assert_eq!(payload["error"], "contact_person is required");
    }

    #[tokio::test]
    async fn grant_listing_and_document_catalog_are_mounted() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(get_request("/api/v1/grants?search=literacy"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["total"], 1);

        let response = router
            .oneshot(get_request("/api/v1/documents"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_submission_bodies_are_refused() {
        let (router, _) = app(true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/api/v1/donations",
                json!({
                    "donor_name": "n".repeat(MAX_REQUEST_BYTES),
                    "email": "anita@example.org",
                    "amount": 1500,
                    "recurring": false,
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn export_notices_are_served() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/documents/rating/export?format=doc",
                json!({ "fields": {} }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let response = router
            .oneshot(get_request("/api/v1/documents/notices"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let notices = json_body(response).await;
        assert_eq!(notices[0]["level"], "info");
        assert!(notices[0]["message"]
            .as_str()
            .expect("message")
            .contains("coming soon"));
    }
}

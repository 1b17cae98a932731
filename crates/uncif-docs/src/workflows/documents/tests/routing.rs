use std::sync::{mpsc, Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::documents::{
    document_router, DocumentKind, DocumentService, DownloadSink, FieldKind, FormData,
    MAX_REQUEST_BYTES,
};

fn post_json(uri: &str, fields: &FormData) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "fields": fields }).to_string()))
        .expect("request")
}

#[tokio::test]
async fn catalog_lists_every_document_kind() {
    let router = document_router(download_service());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/documents")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let kinds: Vec<&str> = payload
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["kind"].as_str())
        .collect();
    assert_eq!(kinds.len(), 8);
    assert!(kinds.contains(&"fee-statement"));
}

#[tokio::test]
async fn preview_returns_filled_document() {
    let router = document_router(download_service());
    let response = router
        .oneshot(post_json("/api/v1/documents/letter/preview", &letter_form()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["title"], "Letter of Recommendation");
    assert_eq!(payload["kind"], "letter");
    assert!(payload["paragraphs"][1]
        .as_str()
        .expect("paragraph")
        .contains("Meera Iyer"));
}

#[tokio::test]
async fn fee_statement_preview_carries_quote() {
    let router = document_router(download_service());
    let response = router
        .oneshot(post_json(
            "/api/v1/documents/fee-statement/preview",
            &fee_statement_form("5", "student"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["fee_quote"]["editing_fee"], 980);
    assert_eq!(payload["fee_quote"]["applicant_total"], 196);
}

#[tokio::test]
async fn export_streams_pdf_attachment() {
    let router = document_router(download_service());
    let response = router
        .oneshot(post_json(
            "/api/v1/documents/letter/export?format=pdf",
            &letter_form(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"UNCIF_Letter_"));
    assert!(disposition.ends_with(".pdf\""));

    let body = read_body(response).await;
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn export_rejects_invalid_forms_with_unprocessable_entity() {
    let router = document_router(download_service());
    let form = letter_form().with("letter_date", "tomorrow");
    let response = router
        .oneshot(post_json("/api/v1/documents/letter/export?format=png", &form))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload: Value = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("message")
        .contains("letter_date"));
}

#[tokio::test]
async fn certificate_doc_stub_is_not_implemented() {
    let router = document_router(download_service());
    let response = router
        .oneshot(post_json(
            "/api/v1/documents/certificate/export?format=doc",
            &certificate_form(),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("message")
        .contains("coming soon"));
}

#[tokio::test]
async fn busy_kind_returns_conflict() {
    let service = download_service();
    let router = document_router(Arc::clone(&service));
    let _held = service
        .control(DocumentKind::Letter)
        .expect("letter control")
        .try_acquire()
        .expect("idle");

    let response = router
        .oneshot(post_json("/api/v1/documents/letter/export", &letter_form()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_kind_and_format_are_rejected() {
    let router = document_router(download_service());
    let response = router
        .clone()
        .oneshot(post_json("/api/v1/documents/brochure/preview", &letter_form()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(post_json(
            "/api/v1/documents/letter/export?format=tiff",
            &letter_form(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_agreement_image_export_is_unprocessable() {
    let router = document_router(download_service());
    let scope = "s".repeat(FieldKind::Multiline.max_chars() + 1);
    let form = long_agreement_form().with("scope", &scope);
    let response = router
        .oneshot(post_json("/api/v1/documents/agreement/export?format=jpg", &form))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        "scope must be at most 8000 characters (found 8001)"
    );
}

#[tokio::test]
async fn request_bodies_over_the_limit_are_refused() {
    let router = document_router(download_service());
    let form = letter_form().with("highlights", &"h".repeat(MAX_REQUEST_BYTES));
    let response = router
        .oneshot(post_json("/api/v1/documents/letter/preview", &form))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn failed_exports_are_listed_as_notices() {
    let router = document_router(download_service());
    let notices = |router: axum::Router| async move {
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/documents/notices")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        read_json_body(response).await
    };
    assert_eq!(notices(router.clone()).await, json!([]));

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/v1/documents/certificate/export?format=doc",
            &certificate_form(),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

    let listed = notices(router).await;
    assert_eq!(listed.as_array().expect("array").len(), 1);
    assert_eq!(listed[0]["level"], "info");
    assert_eq!(
        listed[0]["message"],
        "doc export for certificate is coming soon"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn export_in_progress_leaves_other_routes_responsive() {
    let (started_tx, started_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel();
    let encoder = GatedEncoder {
        started: Mutex::new(started_tx),
        gate: Mutex::new(gate_rx),
    };
    let (pipeline, _) = pipeline(DownloadSink);
    let service = Arc::new(DocumentService::new(
        pipeline.with_encoder(Arc::new(encoder)),
    ));
    let router = document_router(service);

    let export = tokio::spawn(
        router
            .clone()
            .oneshot(post_json("/api/v1/documents/letter/export", &letter_form())),
    );
    while started_rx.try_recv().is_err() {
        tokio::task::yield_now().await;
    }

    // The only runtime thread still serves requests while the encoder holds.
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/documents")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    gate_tx.send(()).expect("encoder waiting");
    let response = export.await.expect("export task").expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, b"%PDF-gated");
}

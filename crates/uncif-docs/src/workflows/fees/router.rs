use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response};
use axum::{routing::post, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::calculator::{ApplicantCategory, FeeCalculator, FeeQuote, PageCount, ProjectType};

#[derive(Debug, Deserialize)]
pub(crate) struct FeeQuoteRequest {
    pub page_count: u32,
    pub category: ApplicantCategory,
    #[serde(default)]
    pub project_type: ProjectType,
}

/// Quote amounts pre-formatted with the rupee sign and Indian digit grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedFees {
    pub editing_fee: String,
    pub documentation_fee: String,
    pub applicant_total: String,
    pub covered_by_organization: String,
    pub application_fee: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeQuoteView {
    #[serde(flatten)]
    pub quote: FeeQuote,
    pub formatted: FormattedFees,
}

impl From<FeeQuote> for FeeQuoteView {
    fn from(quote: FeeQuote) -> Self {
        let formatted = FormattedFees {
            editing_fee: quote.editing_fee.to_string(),
            documentation_fee: quote.documentation_fee.to_string(),
            applicant_total: quote.applicant_total.to_string(),
            covered_by_organization: quote.subsidized().to_string(),
            application_fee: quote.application_fee.to_string(),
        };
        Self { quote, formatted }
    }
}

pub fn fee_router(calculator: Arc<FeeCalculator>) -> Router {
    Router::new()
        .route("/api/v1/fees/quote", post(quote_handler))
        .with_state(calculator)
}

pub(crate) async fn quote_handler(
    State(calculator): State<Arc<FeeCalculator>>,
    axum::Json(request): axum::Json<FeeQuoteRequest>,
) -> Response {
    match PageCount::new(request.page_count) {
        Ok(pages) => {
            let quote = calculator.quote(pages, request.category, request.project_type);
            (StatusCode::OK, axum::Json(FeeQuoteView::from(quote))).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::fees::FeeSchedule;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router() -> Router {
        fee_router(Arc::new(FeeCalculator::new(FeeSchedule::default())))
    }

    fn quote_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/fees/quote")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 4096)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn quote_includes_raw_and_formatted_amounts() {
        let response = router()
            .oneshot(quote_request(json!({
                "page_count": 5,
                "category": "student",
                "project_type": "ecommerce-ai",
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["editing_fee"], 980);
        assert_eq!(payload["documentation_fee"], 0);
        assert_eq!(payload["applicant_total"], 196);
        assert_eq!(payload["application_fee"], 300);
        assert_eq!(payload["project_type"], "ecommerce-ai");
        assert_eq!(payload["formatted"]["editing_fee"], "₹980");
        assert_eq!(payload["formatted"]["covered_by_organization"], "₹784");
    }

    #[tokio::test]
    async fn project_type_defaults_when_omitted() {
        let response = router()
            .oneshot(quote_request(json!({ "page_count": 3, "category": "regular" })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = json_body(response).await;
        assert_eq!(payload["editing_fee"], 700);
        assert_eq!(payload["project_type"], "business-portfolio");
    }

    #[tokio::test]
    async fn zero_pages_is_unprocessable() {
        let response = router()
            .oneshot(quote_request(json!({ "page_count": 0, "category": "founder" })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = json_body(response).await;
        assert_eq!(payload["error"], "page count must be at least 1");
    }
}

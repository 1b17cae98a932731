//! Intake of donations, office registrations and grant applications through the public
//! service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use uncif_docs::workflows::fees::{FeeCalculator, FeeSchedule};
    use uncif_docs::workflows::submissions::{
        RepositoryError, SubmissionId, SubmissionKind, SubmissionRecord, SubmissionRepository,
        SubmissionService,
    };

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Mutex<HashMap<SubmissionId, SubmissionRecord>>,
    }

    impl SubmissionRepository for MemoryRepository {
        fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&record.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.id.clone(), record.clone());
            Ok(record)
        }

        fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(id).cloned())
        }

        fn list(
            &self,
            kind: Option<SubmissionKind>,
        ) -> Result<Vec<SubmissionRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            let mut records: Vec<SubmissionRecord> = guard
                .values()
                .filter(|record| kind.map_or(true, |kind| record.payload.kind() == kind))
                .cloned()
                .collect();
            records.sort_by(|left, right| left.id.0.cmp(&right.id.0));
            Ok(records)
        }
    }

    pub(super) fn build_service() -> Arc<SubmissionService<MemoryRepository>> {
        Arc::new(SubmissionService::new(
            Arc::new(MemoryRepository::default()),
            Arc::new(FeeCalculator::new(FeeSchedule::default())),
        ))
    }
}

mod service {
    use super::common::*;
    use uncif_docs::workflows::fees::{ApplicantCategory, ProjectType, Rupees};
    use uncif_docs::workflows::submissions::{
        DonationForm, GrantApplicationForm, OfficeRegistrationForm, SubmissionKind,
        SubmissionServiceError,
    };
    use uncif_docs::workflows::validation::ValidationError;

    fn donation(amount: u64) -> DonationForm {
        DonationForm {
            donor_name: "Ravi Kumar".to_string(),
            email: "ravi@example.org".to_string(),
            amount: Rupees(amount),
            message: None,
            recurring: false,
        }
    }

    #[test]
    fn ids_advance_per_submission_kind() {
        let service = build_service();
        let first = service.submit_donation(donation(500)).expect("accepted");
        let second = service.submit_donation(donation(750)).expect("accepted");
        let office = service
            .register_office(OfficeRegistrationForm {
                office_name: "Pune Chapter".to_string(),
                contact_person: "L. Joshi".to_string(),
                email: "pune@example.org".to_string(),
                phone: "+91 20 5555 0101".to_string(),
                city: "Pune".to_string(),
                region: None,
            })
            .expect("accepted");

        assert_eq!(first.id.to_string(), "don-000001");
        assert_eq!(second.id.to_string(), "don-000002");
        assert_eq!(office.id.to_string(), "off-000001");

        let donations = service
            .list(Some(SubmissionKind::Donation))
            .expect("listed");
        assert_eq!(donations.len(), 2);
        assert_eq!(service.list(None).expect("listed").len(), 3);
    }

    #[test]
    fn grant_application_over_page_limit_is_rejected() {
        let service = build_service();
        let error = service
            .apply_for_grant(GrantApplicationForm {
                applicant_name: "Nisha Rao".to_string(),
                email: "nisha@example.org".to_string(),
                project_title: "Seed Library".to_string(),
                project_type: ProjectType::BusinessPortfolio,
                category: ApplicantCategory::FinancialAid,
                page_count: 11,
                summary: "Community seed exchange.".to_string(),
            })
            .expect_err("limit is ten pages");

        assert!(matches!(
            error,
            SubmissionServiceError::Validation(ValidationError::PageCountOutOfRange {
                max: 10,
                found: 11,
                ..
            })
        ));
        assert!(service.list(None).expect("listed").is_empty());
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uncif_docs::workflows::submissions::submission_router;

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn grant_application_receipt_includes_fee_quote() {
        let router = submission_router(build_service());
        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/grant-applications",
                json!({
                    "applicant_name": "Kabir Shah",
                    "email": "kabir@example.org",
                    "project_title": "Village Market App",
                    "project_type": "ecommerce-ai",
                    "category": "student",
                    "page_count": 5,
                    "summary": "Marketplace connecting farmers with buyers."
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let receipt = json_body(response).await;
        assert_eq!(receipt["id"], "gra-000001");
        assert_eq!(receipt["kind"], "grant_application");
        assert_eq!(receipt["fee_quote"]["editing_fee"], 980);
        assert_eq!(receipt["fee_quote"]["applicant_total"], 196);

        let fetched = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/submissions/gra-000001")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(fetched.status(), StatusCode::OK);
        let stored = json_body(fetched).await;
        assert_eq!(stored["kind"], "grant_application");
        assert_eq!(stored["summary"], "Village Market App (5 pages, Student)");
    }

    #[tokio::test]
    async fn zero_donation_is_unprocessable() {
        let response = submission_router(build_service())
            .oneshot(post(
                "/api/v1/donations",
                json!({
                    "donor_name": "Ravi Kumar",
                    "email": "ravi@example.org",
                    "amount": 0
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = json_body(response).await;
        assert_eq!(payload["error"], "donation amount must be greater than zero");
    }

    #[tokio::test]
    async fn unknown_submission_is_not_found() {
        let response = submission_router(build_service())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/submissions/don-999999")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

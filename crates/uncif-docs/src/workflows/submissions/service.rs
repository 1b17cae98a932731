use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    DonationForm, GrantApplicationForm, OfficeRegistrationForm, SubmissionId, SubmissionKind,
    SubmissionPayload, SubmissionRecord,
};
use super::repository::{RepositoryError, SubmissionRepository};
use crate::workflows::fees::{FeeCalculator, FeeQuote, PageCount};
use crate::workflows::validation::ValidationError;

/// Per-kind counters behind `don-000001`, `off-000001`, `gra-000001`.
#[derive(Debug)]
struct SubmissionSequences {
    donation: AtomicU64,
    office: AtomicU64,
    grant: AtomicU64,
}

impl SubmissionSequences {
    fn new() -> Self {
        Self {
            donation: AtomicU64::new(1),
            office: AtomicU64::new(1),
            grant: AtomicU64::new(1),
        }
    }

    fn next(&self, kind: SubmissionKind) -> SubmissionId {
        let counter = match kind {
            SubmissionKind::Donation => &self.donation,
            SubmissionKind::OfficeRegistration => &self.office,
            SubmissionKind::GrantApplication => &self.grant,
        };
        let id = counter.fetch_add(1, Ordering::Relaxed);
        SubmissionId(format!("{}-{id:06}", kind.prefix()))
    }
}

/// Validates intake forms, assigns ids and stores the records.
pub struct SubmissionService<R> {
    repository: Arc<R>,
    calculator: Arc<FeeCalculator>,
    sequences: SubmissionSequences,
}

impl<R> SubmissionService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>, calculator: Arc<FeeCalculator>) -> Self {
        Self {
            repository,
            calculator,
            sequences: SubmissionSequences::new(),
        }
    }

    pub fn submit_donation(
        &self,
        form: DonationForm,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        let form = form.validated()?;
        self.store(SubmissionPayload::Donation(form), None)
    }

    pub fn register_office(
        &self,
        form: OfficeRegistrationForm,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        let form = form.validated()?;
        self.store(SubmissionPayload::OfficeRegistration(form), None)
    }

    /// Grant applications carry the fee quote for their documentation request.
    pub fn apply_for_grant(
        &self,
        form: GrantApplicationForm,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        let form = form.validated(self.calculator.schedule().max_page_count)?;
        let pages = PageCount::new(form.page_count).map_err(ValidationError::from)?;
        let quote = self.calculator.quote(pages, form.category, form.project_type);
        self.store(SubmissionPayload::GrantApplication(form), Some(quote))
    }

    pub fn get(&self, id: &SubmissionId) -> Result<SubmissionRecord, SubmissionServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(
        &self,
        kind: Option<SubmissionKind>,
    ) -> Result<Vec<SubmissionRecord>, SubmissionServiceError> {
        Ok(self.repository.list(kind)?)
    }

    fn store(
        &self,
        payload: SubmissionPayload,
        fee_quote: Option<FeeQuote>,
    ) -> Result<SubmissionRecord, SubmissionServiceError> {
        let kind = payload.kind();
        let record = SubmissionRecord {
            id: self.sequences.next(kind),
            received_at: Utc::now(),
            payload,
            fee_quote,
        };

        let stored = self.repository.insert(record)?;
        tracing::info!(
            id = %stored.id,
            kind = kind.label(),
            summary = %stored.payload.summary(),
            "submission received"
        );
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

//! Donation, office registration and grant application intake.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    DonationForm, GrantApplicationForm, OfficeRegistrationForm, SubmissionId, SubmissionKind,
    SubmissionPayload, SubmissionReceipt, SubmissionRecord,
};
pub use repository::{RepositoryError, SubmissionRepository};
pub use router::submission_router;
pub use service::{SubmissionService, SubmissionServiceError};

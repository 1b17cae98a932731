use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::fees::{ApplicantCategory, FeeQuote, ProjectType, Rupees};
use crate::workflows::validation::{email, required, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Donation,
    OfficeRegistration,
    GrantApplication,
}

impl SubmissionKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Donation => "don",
            Self::OfficeRegistration => "off",
            Self::GrantApplication => "gra",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Donation => "Donation",
            Self::OfficeRegistration => "Office registration",
            Self::GrantApplication => "Grant application",
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationForm {
    pub donor_name: String,
    pub email: String,
    pub amount: Rupees,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recurring: bool,
}

impl DonationForm {
    /// Trimmed copy, or the first rule the form breaks.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let donor_name = required("donor_name", &self.donor_name)?.to_string();
        email("email", &self.email)?;
        if self.amount == Rupees::ZERO {
            return Err(ValidationError::InvalidAmount);
        }

        Ok(Self {
            donor_name,
            email: self.email.trim().to_string(),
            amount: self.amount,
            message: trimmed(&self.message),
            recurring: self.recurring,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeRegistrationForm {
    pub office_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl OfficeRegistrationForm {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let office_name = required("office_name", &self.office_name)?.to_string();
        let contact_person = required("contact_person", &self.contact_person)?.to_string();
        email("email", &self.email)?;
        let phone = phone("phone", &self.phone)?;
        let city = required("city", &self.city)?.to_string();

        Ok(Self {
            office_name,
            contact_person,
            email: self.email.trim().to_string(),
            phone,
            city,
            region: trimmed(&self.region),
        })
    }
}

/// Digits with optional `+`, spaces, dashes or parentheses; 7 to 15 digits.
fn phone(field: &str, value: &str) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    let allowed = value
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | ' ' | '-' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();

    if allowed && (7..=15).contains(&digits) {
        Ok(value.to_string())
    } else {
        Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantApplicationForm {
    pub applicant_name: String,
    pub email: String,
    pub project_title: String,
    #[serde(default)]
    pub project_type: ProjectType,
    pub category: ApplicantCategory,
    pub page_count: u32,
    pub summary: String,
}

impl GrantApplicationForm {
    /// Page count is bounded by the intake limit, unlike the calculator itself.
    pub fn validated(&self, max_page_count: u32) -> Result<Self, ValidationError> {
        let applicant_name = required("applicant_name", &self.applicant_name)?.to_string();
        email("email", &self.email)?;
        let project_title = required("project_title", &self.project_title)?.to_string();
        let summary = required("summary", &self.summary)?.to_string();
        if self.page_count == 0 || self.page_count > max_page_count {
            return Err(ValidationError::PageCountOutOfRange {
                min: 1,
                max: max_page_count,
                found: self.page_count,
            });
        }

        Ok(Self {
            applicant_name,
            email: self.email.trim().to_string(),
            project_title,
            project_type: self.project_type,
            category: self.category,
            page_count: self.page_count,
            summary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "form", rename_all = "snake_case")]
pub enum SubmissionPayload {
    Donation(DonationForm),
    OfficeRegistration(OfficeRegistrationForm),
    GrantApplication(GrantApplicationForm),
}

impl SubmissionPayload {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Self::Donation(_) => SubmissionKind::Donation,
            Self::OfficeRegistration(_) => SubmissionKind::OfficeRegistration,
            Self::GrantApplication(_) => SubmissionKind::GrantApplication,
        }
    }

    /// One-line description used in receipts and logs; never includes contact details.
    pub fn summary(&self) -> String {
        match self {
            Self::Donation(form) => {
                let cadence = if form.recurring { "monthly" } else { "one-time" };
                format!("{} {cadence} donation from {}", form.amount, form.donor_name)
            }
            Self::OfficeRegistration(form) => {
                format!("{} office in {}", form.office_name, form.city)
            }
            Self::GrantApplication(form) => format!(
                "{} ({} pages, {})",
                form.project_title,
                form.page_count,
                form.category.label()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub received_at: DateTime<Utc>,
    pub payload: SubmissionPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_quote: Option<FeeQuote>,
}

impl SubmissionRecord {
    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            id: self.id.clone(),
            kind: self.payload.kind(),
            received_at: self.received_at,
            summary: self.payload.summary(),
            fee_quote: self.fee_quote.clone(),
        }
    }
}

/// Acknowledgement returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
    pub kind: SubmissionKind,
    pub received_at: DateTime<Utc>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_quote: Option<FeeQuote>,
}

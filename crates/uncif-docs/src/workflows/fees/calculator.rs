use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use super::currency::Rupees;
use super::schedule::FeeSchedule;

/// Applicant classes that control documentation-fee waivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicantCategory {
    Regular,
    Student,
    FinancialAid,
    Founder,
}

impl ApplicantCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Regular,
            Self::Student,
            Self::FinancialAid,
            Self::Founder,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Student => "Student",
            Self::FinancialAid => "Financial Aid",
            Self::Founder => "Founder",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Student => "student",
            Self::FinancialAid => "financial-aid",
            Self::Founder => "founder",
        }
    }

    pub const fn waives_documentation_fee(self) -> bool {
        matches!(self, Self::Student | Self::FinancialAid | Self::Founder)
    }
}

impl FromStr for ApplicantCategory {
    type Err = FeeInputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "regular" => Ok(Self::Regular),
            "student" => Ok(Self::Student),
            "financial-aid" | "financialaid" => Ok(Self::FinancialAid),
            "founder" => Ok(Self::Founder),
            _ => Err(FeeInputError::UnknownCategory(value.to_string())),
        }
    }
}

/// Project classification collected alongside a quote. Carried as metadata; it does not
/// change pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    #[default]
    BusinessPortfolio,
    EcommerceAi,
}

impl ProjectType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessPortfolio => "Business Portfolio",
            Self::EcommerceAi => "E-commerce / AI",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::BusinessPortfolio => "business-portfolio",
            Self::EcommerceAi => "ecommerce-ai",
        }
    }
}

impl FromStr for ProjectType {
    type Err = FeeInputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "business-portfolio" | "business" | "portfolio" => Ok(Self::BusinessPortfolio),
            "ecommerce-ai" | "ecommerce" | "ai" => Ok(Self::EcommerceAi),
            _ => Err(FeeInputError::UnknownProjectType(value.to_string())),
        }
    }
}

/// Number of pages in a request; zero is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageCount(NonZeroU32);

impl PageCount {
    pub fn new(pages: u32) -> Result<Self, FeeInputError> {
        NonZeroU32::new(pages)
            .map(Self)
            .ok_or(FeeInputError::ZeroPages)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for PageCount {
    type Error = FeeInputError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageCount> for u32 {
    fn from(value: PageCount) -> Self {
        value.get()
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Rejected calculator inputs, raised at the caller boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeInputError {
    #[error("page count must be at least 1")]
    ZeroPages,
    #[error("unknown applicant category '{0}'")]
    UnknownCategory(String),
    #[error("unknown project type '{0}'")]
    UnknownProjectType(String),
}

/// Derived fee breakdown for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub page_count: PageCount,
    pub category: ApplicantCategory,
    pub project_type: ProjectType,
    pub editing_fee: Rupees,
    pub documentation_fee: Rupees,
    pub application_fee: Rupees,
    pub applicant_total: Rupees,
}

impl FeeQuote {
    /// Combined service fees the applicant share is taken from.
    pub fn service_fees(&self) -> Rupees {
        self.editing_fee + self.documentation_fee
    }

    /// Portion of the service fees covered by the organization.
    pub fn subsidized(&self) -> Rupees {
        Rupees(self.service_fees().0.saturating_sub(self.applicant_total.0))
    }
}

/// Stateless calculator bound to a fee schedule.
#[derive(Debug, Clone, Default)]
pub struct FeeCalculator {
    schedule: FeeSchedule,
}

impl FeeCalculator {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn quote(
        &self,
        page_count: PageCount,
        category: ApplicantCategory,
        project_type: ProjectType,
    ) -> FeeQuote {
        let schedule = &self.schedule;
        let extra_pages = page_count.get().saturating_sub(schedule.included_pages);
        let editing_fee = schedule.base_fee + schedule.per_page_fee.saturating_mul(extra_pages);

        let documentation_fee = if category.waives_documentation_fee() {
            Rupees::ZERO
        } else {
            schedule.documentation_fee
        };

        let applicant_total =
            (editing_fee + documentation_fee).share(schedule.applicant_share_percent);

        FeeQuote {
            page_count,
            category,
            project_type,
            editing_fee,
            documentation_fee,
            application_fee: schedule.application_fee,
            applicant_total,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::currency::Rupees;

/// Pricing dials for documentation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub base_fee: Rupees,
    pub per_page_fee: Rupees,
    /// Pages covered by the base fee before the per-page surcharge applies.
    pub included_pages: u32,
    /// Charged to non-waived categories only.
    pub documentation_fee: Rupees,
    pub application_fee: Rupees,
    pub applicant_share_percent: u8,
    /// Upper bound enforced by intake forms; the calculator itself is unbounded.
    pub max_page_count: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            base_fee: Rupees(700),
            per_page_fee: Rupees(140),
            included_pages: 3,
            documentation_fee: Rupees(0),
            application_fee: Rupees(300),
            applicant_share_percent: 20,
            max_page_count: 10,
        }
    }
}

use serde::{Deserialize, Serialize};

use super::GrantListing;

pub const DEFAULT_PER_PAGE: usize = 6;
pub const MAX_PER_PAGE: usize = 50;

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrantQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub focus_area: Option<String>,
    #[serde(default)]
    pub open_only: bool,
    /// 1-based; out-of-range values are clamped.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for GrantQuery {
    fn default() -> Self {
        Self {
            search: None,
            focus_area: None,
            open_only: false,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl GrantQuery {
    pub(crate) fn matches(&self, listing: &GrantListing) -> bool {
        if self.open_only && listing.status != super::GrantStatus::Open {
            return false;
        }

        if let Some(area) = non_blank(&self.focus_area) {
            if !listing.focus_area.eq_ignore_ascii_case(area) {
                return false;
            }
        }

        match non_blank(&self.search) {
            Some(term) => {
                let term = term.to_lowercase();
                listing.title.to_lowercase().contains(&term)
                    || listing.focus_area.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantPage {
    pub items: Vec<GrantListing>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl GrantPage {
    /// Slice one page out of the filtered matches; an empty result still reports one page.
    pub fn from_matches(matches: &[&GrantListing], page: usize, per_page: usize) -> Self {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let total = matches.len();
        let total_pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        let start = (page - 1) * per_page;
        let items = matches
            .iter()
            .skip(start)
            .take(per_page)
            .map(|listing| (*listing).clone())
            .collect();

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

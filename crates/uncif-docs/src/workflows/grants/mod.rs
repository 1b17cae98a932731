//! Grants listing: a CSV-backed directory with search, focus-area filter and pagination.

mod parser;
pub mod query;
pub mod router;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::workflows::fees::Rupees;

pub use query::{GrantPage, GrantQuery};
pub use router::grant_router;

const EMBEDDED_GRANTS: &str = include_str!("data/grants.csv");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantListing {
    pub id: String,
    pub title: String,
    pub focus_area: String,
    pub region: String,
    pub max_award: Rupees,
    pub deadline: NaiveDate,
    pub status: GrantStatus,
}

#[derive(Debug)]
pub enum GrantCatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for GrantCatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantCatalogError::Io(err) => write!(f, "failed to read grants file: {}", err),
            GrantCatalogError::Csv(err) => write!(f, "invalid grants CSV data: {}", err),
        }
    }
}

impl std::error::Error for GrantCatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrantCatalogError::Io(err) => Some(err),
            GrantCatalogError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for GrantCatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for GrantCatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// In-memory grants listing.
#[derive(Debug, Clone, Default)]
pub struct GrantDirectory {
    listings: Vec<GrantListing>,
}

impl GrantDirectory {
    /// Listings bundled with the crate.
    pub fn embedded() -> Result<Self, GrantCatalogError> {
        Self::from_reader(EMBEDDED_GRANTS.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GrantCatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GrantCatalogError> {
        Ok(Self::from_listings(parser::parse_listings(reader)?))
    }

    pub fn from_listings(listings: Vec<GrantListing>) -> Self {
        Self { listings }
    }

    pub fn listings(&self) -> &[GrantListing] {
        &self.listings
    }

    /// Distinct focus areas in first-seen order.
    pub fn focus_areas(&self) -> Vec<&str> {
        let mut areas: Vec<&str> = Vec::new();
        for listing in &self.listings {
            if !areas
                .iter()
                .any(|area| area.eq_ignore_ascii_case(&listing.focus_area))
            {
                areas.push(&listing.focus_area);
            }
        }
        areas
    }

    pub fn search(&self, query: &GrantQuery) -> GrantPage {
        let matches: Vec<&GrantListing> = self
            .listings
            .iter()
            .filter(|listing| query.matches(listing))
            .collect();
        GrantPage::from_matches(&matches, query.page, query.per_page)
    }
}

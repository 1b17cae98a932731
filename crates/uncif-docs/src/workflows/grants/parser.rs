use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::{GrantListing, GrantStatus};
use crate::workflows::fees::Rupees;

pub(crate) fn parse_listings<R: Read>(reader: R) -> Result<Vec<GrantListing>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut listings = Vec::new();

    for record in csv_reader.deserialize::<GrantRow>() {
        let row = record?;
        listings.push(GrantListing {
            id: row.id,
            title: row.title,
            focus_area: row.focus_area,
            region: row.region.unwrap_or_else(|| "All regions".to_string()),
            max_award: Rupees(row.max_award),
            deadline: row.deadline,
            status: row.status,
        });
    }

    Ok(listings)
}

#[derive(Debug, Deserialize)]
struct GrantRow {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Focus Area")]
    focus_area: String,
    #[serde(rename = "Region", default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(rename = "Max Award")]
    max_award: u64,
    #[serde(rename = "Deadline", deserialize_with = "iso_date")]
    deadline: NaiveDate,
    #[serde(rename = "Status")]
    status: GrantStatus,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(serde::de::Error::custom)
}

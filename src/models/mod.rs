use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One listing extracted from a result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Site id of the profile that produced the record
    pub site: String,
    pub external_id: Option<String>,
    pub url: String,
    pub price: f64,
    /// Living area in square meters
    pub area: f64,
    pub rooms_count: u32,
    pub location: Option<String>,
    /// Local publication time; date-only sources are set to noon
    pub published_at: Option<NaiveDateTime>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub real_estate_agent: Option<String>,
    pub new_build: bool,
}

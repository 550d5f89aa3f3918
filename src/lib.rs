//! Extracts real-estate listings from paginated result pages

pub mod config;
pub mod models;
pub mod output;
pub mod scrapers;

use crate::models::ListingRecord;
use crate::scrapers::traits::ListingSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// Writes listings as a pretty-printed JSON array, and optionally one JSON
/// file per listing into `raw_dir`
pub struct JsonFileSink {
    path: PathBuf,
    raw_dir: Option<PathBuf>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            raw_dir: None,
        }
    }

    pub fn with_raw_dir(mut self, raw_dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = Some(raw_dir.into());
        self
    }
}

/// File name for a single listing: its external id when it has a usable one,
/// its position otherwise
fn raw_file_name(index: usize, listing: &ListingRecord) -> String {
    let id = listing
        .external_id
        .as_deref()
        .map(|id| {
            id.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect::<String>()
        })
        .filter(|id| !id.is_empty());

    match id {
        Some(id) => format!("{}-{}.json", listing.site, id),
        None => format!("{}-{:05}.json", listing.site, index + 1),
    }
}

/// File names for a whole batch. A name already taken, from a repeated
/// external id, gets the listing position appended
fn raw_file_names(listings: &[ListingRecord]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(listings.len());
    listings
        .iter()
        .enumerate()
        .map(|(index, listing)| {
            let mut name = raw_file_name(index, listing);
            if taken.contains(&name) {
                name = format!("{}-{:05}.json", name.trim_end_matches(".json"), index + 1);
                warn!(site = %listing.site, file = %name, "Duplicate external id in raw output");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

#[async_trait]
impl ListingSink for JsonFileSink {
    async fn write(&self, listings: &[ListingRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(listings)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!("💾 Saved {} listings to {}", listings.len(), self.path.display());

        if let Some(raw_dir) = &self.raw_dir {
            tokio::fs::create_dir_all(raw_dir)
                .await
                .with_context(|| format!("Failed to create {}", raw_dir.display()))?;

            for (listing, name) in listings.iter().zip(raw_file_names(listings)) {
                let filename = raw_dir.join(name);
                let listing_json = serde_json::to_string_pretty(listing)?;
                tokio::fs::write(&filename, listing_json).await?;
            }

            info!("💾 Saved {} individual listing files to {}", listings.len(), raw_dir.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(external_id: Option<&str>) -> ListingRecord {
        ListingRecord {
            site: "demo".to_string(),
            external_id: external_id.map(str::to_string),
            url: "https://immo.example/annonce/1".to_string(),
            price: 250_000.0,
            area: 48.5,
            rooms_count: 2,
            location: Some("Nantes".to_string()),
            published_at: None,
            title: None,
            description: None,
            photo: None,
            real_estate_agent: None,
            new_build: false,
        }
    }

    #[test]
    fn test_raw_file_name() {
        assert_eq!(raw_file_name(0, &listing(Some("A/42"))), "demo-A_42.json");
        assert_eq!(raw_file_name(6, &listing(None)), "demo-00007.json");
    }

    #[tokio::test]
    async fn test_write_listings_and_raw_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("listings.json")).with_raw_dir(dir.path().join("raw"));
        let listings = vec![listing(Some("1")), listing(None)];

        sink.write(&listings).await.unwrap();

        let saved = tokio::fs::read_to_string(dir.path().join("listings.json")).await.unwrap();
        let parsed: Vec<ListingRecord> = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed, listings);
        assert!(dir.path().join("raw/demo-1.json").exists());
        assert!(dir.path().join("raw/demo-00002.json").exists());
    }

    #[tokio::test]
    async fn test_duplicate_external_ids_keep_every_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let raw_dir = dir.path().join("raw");
        let mut first = listing(Some("42"));
        first.price = 100_000.0;
        let mut second = listing(Some("42"));
        second.price = 200_000.0;
        let listings = vec![first, second, listing(Some("7"))];

        assert_eq!(
            raw_file_names(&listings),
            vec!["demo-42.json", "demo-42-00002.json", "demo-7.json"]
        );

        let sink = JsonFileSink::new(dir.path().join("listings.json")).with_raw_dir(&raw_dir);
        sink.write(&listings).await.unwrap();

        assert_eq!(std::fs::read_dir(&raw_dir).unwrap().count(), 3);
        let saved = std::fs::read_to_string(raw_dir.join("demo-42-00002.json")).unwrap();
        let saved: ListingRecord = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved.price, 200_000.0);
    }
}

use scraper::Html;
use tracing::{info, warn};
use url::Url;

use super::error::{ParseError, ParseResult};
use super::pagination::PageTraversal;
use super::pipeline::extract_items;
use super::profile::SiteProfile;
use super::traits::PageFetcher;
use crate::models::ListingRecord;

/// Parse `initial_html` and every page reachable through its next-page links.
///
/// The fetcher is used for every later page and dropped when this returns,
/// whatever the outcome. Relative links resolve against the profile base URL.
pub fn parse<F: PageFetcher>(
    initial_html: &str,
    profile: &SiteProfile,
    fetcher: F,
) -> ParseResult<Vec<ListingRecord>> {
    let document = Html::parse_document(initial_html);
    parse_document(document, None, profile, fetcher)
}

/// Fetch `start_url` with `fetcher`, then parse it like [`parse`]
pub fn parse_from_url<F: PageFetcher>(
    start_url: &Url,
    profile: &SiteProfile,
    mut fetcher: F,
) -> ParseResult<Vec<ListingRecord>> {
    info!(site = %profile.site_id(), url = %start_url, fetcher = fetcher.name(), "Opening first result page");
    let source = fetcher.fetch(start_url).map_err(|e| ParseError::Fetch {
        url: start_url.clone(),
        source: e.into(),
    })?;
    let document = Html::parse_document(&source);
    parse_document(document, Some(start_url.clone()), profile, fetcher)
}

fn parse_document<F: PageFetcher>(
    document: Html,
    page_url: Option<Url>,
    profile: &SiteProfile,
    fetcher: F,
) -> ParseResult<Vec<ListingRecord>> {
    let site = profile.site_id();
    let mut traversal = PageTraversal::new(document, page_url, profile, fetcher);
    let mut listings = Vec::new();
    let mut skipped = 0usize;

    for page in traversal.by_ref() {
        let items = extract_items(&page.document, page.url.as_ref(), profile)?;
        for item in items {
            match item {
                Ok(listing) => listings.push(listing),
                Err(e) => {
                    skipped += 1;
                    warn!(site = %site, error = %e, "Skipping listing");
                }
            }
        }
    }

    info!(
        site = %site,
        pages = traversal.pages_visited(),
        listings = listings.len(),
        skipped,
        "Parse finished"
    );
    Ok(listings)
}

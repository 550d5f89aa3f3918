use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::error::{NoItemsFoundError, RequiredFieldError};
use super::fields::{
    extract_external_id, extract_float_field, extract_int_field, extract_link,
    extract_optional_text, extract_published_at, is_new_build, parse_selector,
};
use super::profile::{FieldName, SiteProfile};
use crate::models::ListingRecord;

/// Outcome for a single item wrapper, in document order
pub type ItemResult = Result<ListingRecord, RequiredFieldError>;

/// Extract every listing on `document`.
///
/// Fails only when the wrapper selector itself cannot be evaluated. A wrapper
/// selector that matches nothing gives an empty list.
pub fn extract_items(
    document: &Html,
    page_url: Option<&Url>,
    profile: &SiteProfile,
) -> Result<Vec<ItemResult>, NoItemsFoundError> {
    let wrapper = profile.selector(FieldName::AdWrapper).unwrap_or_default();
    let selector = parse_selector(wrapper).map_err(|e| NoItemsFoundError {
        site: profile.site_id().to_string(),
        selector: wrapper.to_string(),
        reason: e.to_string(),
    })?;

    let base = page_url.or(profile.base_url());
    let items: Vec<ItemResult> = document
        .select(&selector)
        .map(|item| build_record(item, profile, base))
        .collect();

    debug!(site = %profile.site_id(), count = items.len(), "Found item wrappers");
    Ok(items)
}

/// Build one record, stopping at the first required field that fails
pub fn build_record(
    item: ElementRef<'_>,
    profile: &SiteProfile,
    base: Option<&Url>,
) -> Result<ListingRecord, RequiredFieldError> {
    let url = extract_link(item, profile, FieldName::Url, &["href"], base).required(FieldName::Url)?;
    let price = extract_float_field(item, profile, FieldName::Price).required(FieldName::Price)?;
    let area = extract_float_field(item, profile, FieldName::Area).required(FieldName::Area)?;
    let rooms_count =
        extract_int_field(item, profile, FieldName::RoomsCount).required(FieldName::RoomsCount)?;

    let title = extract_optional_text(item, profile, FieldName::Title);
    let description = extract_optional_text(item, profile, FieldName::Description);
    let new_build = is_new_build(item, profile, title.as_deref(), description.as_deref());

    Ok(ListingRecord {
        site: profile.site_id().to_string(),
        external_id: extract_external_id(item, profile),
        url,
        price,
        area,
        rooms_count,
        location: extract_optional_text(item, profile, FieldName::Location),
        published_at: extract_published_at(item, profile),
        title,
        description,
        photo: extract_link(item, profile, FieldName::Photo, &["src", "data-src"], base).optional(),
        real_estate_agent: extract_optional_text(item, profile, FieldName::RealEstateAgent),
        new_build,
    })
}

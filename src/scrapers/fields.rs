use chrono::NaiveDateTime;
use scraper::{ElementRef, Selector};
use url::Url;

use super::error::{FieldError, RequiredFieldError};
use super::profile::{FieldName, SiteProfile};
use super::text::{contains_any, extract_float, extract_int, normalize_whitespace};

/// Words in listing titles or descriptions that mark a new build
pub const NEW_BUILD_KEYWORDS: [&str; 5] = ["neuf", "neuve", "livraison", "programme", "vefa"];

/// Outcome of extracting one field
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    Value(T),
    /// The profile has no selector for this field
    Absent,
    Failed(FieldError),
}

impl<T> Extracted<T> {
    /// A missing value is an error for this item
    pub fn required(self, field: FieldName) -> Result<T, RequiredFieldError> {
        match self {
            Extracted::Value(value) => Ok(value),
            Extracted::Absent => Err(RequiredFieldError {
                field,
                cause: FieldError::NotConfigured,
            }),
            Extracted::Failed(cause) => Err(RequiredFieldError { field, cause }),
        }
    }

    /// A missing value, for whatever reason, is just no value
    pub fn optional(self) -> Option<T> {
        match self {
            Extracted::Value(value) => Some(value),
            Extracted::Absent | Extracted::Failed(_) => None,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Extracted<U>) -> Extracted<U> {
        match self {
            Extracted::Value(value) => f(value),
            Extracted::Absent => Extracted::Absent,
            Extracted::Failed(err) => Extracted::Failed(err),
        }
    }
}

impl<T> From<Result<T, FieldError>> for Extracted<T> {
    fn from(result: Result<T, FieldError>) -> Self {
        match result {
            Ok(value) => Extracted::Value(value),
            Err(err) => Extracted::Failed(err),
        }
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector, FieldError> {
    Selector::parse(selector).map_err(|e| FieldError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Every element matching `selector`, starting with `scope` itself when it
/// matches (a wrapper can be the link it describes).
fn matches<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut found = Vec::new();
    if selector.matches(&scope) {
        found.push(scope);
    }
    found.extend(scope.select(selector));
    found
}

fn first_match<'a>(scope: ElementRef<'a>, selector: &str) -> Result<ElementRef<'a>, FieldError> {
    let parsed = parse_selector(selector)?;
    matches(scope, &parsed)
        .into_iter()
        .next()
        .ok_or_else(|| FieldError::NoMatch(selector.to_string()))
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn configured(profile: &SiteProfile, field: FieldName) -> Extracted<&str> {
    match profile.selector(field) {
        Some(selector) => Extracted::Value(selector),
        None => Extracted::Absent,
    }
}

/// Normalised text of the first node matching the field's selector
pub fn extract_text(scope: ElementRef<'_>, profile: &SiteProfile, field: FieldName) -> Extracted<String> {
    configured(profile, field)
        .and_then(|selector| first_match(scope, selector).map(element_text).into())
}

/// Like [`extract_text`], with blank text treated as no value
pub fn extract_optional_text(
    scope: ElementRef<'_>,
    profile: &SiteProfile,
    field: FieldName,
) -> Option<String> {
    extract_text(scope, profile, field)
        .optional()
        .filter(|text| !text.is_empty())
}

pub fn extract_float_field(
    scope: ElementRef<'_>,
    profile: &SiteProfile,
    field: FieldName,
) -> Extracted<f64> {
    extract_text(scope, profile, field)
        .and_then(|text| extract_float(&text).ok_or(FieldError::NotNumeric(text)).into())
}

pub fn extract_int_field(
    scope: ElementRef<'_>,
    profile: &SiteProfile,
    field: FieldName,
) -> Extracted<u32> {
    extract_text(scope, profile, field)
        .and_then(|text| extract_int(&text).ok_or(FieldError::NotNumeric(text)).into())
}

/// Read the first present attribute out of `attributes` on the first match,
/// resolved against `base` when relative.
pub fn extract_link(
    scope: ElementRef<'_>,
    profile: &SiteProfile,
    field: FieldName,
    attributes: &[&str],
    base: Option<&Url>,
) -> Extracted<String> {
    configured(profile, field).and_then(|selector| {
        first_match(scope, selector)
            .and_then(|element| {
                attributes
                    .iter()
                    .filter_map(|name| element.value().attr(name))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
                    .map(|href| resolve_link(href, base))
                    .ok_or_else(|| FieldError::MissingAttribute {
                        selector: selector.to_string(),
                        attribute: attributes.join("|"),
                    })
            })
            .into()
    })
}

/// Absolute form of `href` when it can be built, the raw value otherwise
pub fn resolve_link(href: &str, base: Option<&Url>) -> String {
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    resolved
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Publication date using the profile's date format
pub fn extract_published_at(scope: ElementRef<'_>, profile: &SiteProfile) -> Option<NaiveDateTime> {
    let format = profile.date_format()?;
    extract_optional_text(scope, profile, FieldName::PublishedAt).and_then(|text| format.parse(&text))
}

/// Split `locator[attribute]` into its locator and attribute name.
///
/// The bracket group only counts as an attribute name when it is a bare
/// identifier, so `a[href*='/ad/']` has no attribute part.
pub fn split_attribute_selector(selector: &str) -> Option<(&str, &str)> {
    let inner_end = selector.trim_end().strip_suffix(']')?;
    let open = inner_end.rfind('[')?;
    let attribute = inner_end[open + 1..].trim();
    let is_name = !attribute.is_empty()
        && attribute
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
    is_name.then(|| (inner_end[..open].trim(), attribute))
}

/// External id read from the attribute packed into the selector. An empty
/// locator reads the attribute from the listing wrapper itself.
pub fn extract_external_id(scope: ElementRef<'_>, profile: &SiteProfile) -> Option<String> {
    let selector = profile.selector(FieldName::ExternalId)?;
    let (locator, attribute) = split_attribute_selector(selector)?;
    let element = if locator.is_empty() {
        scope
    } else {
        first_match(scope, locator).ok()?
    };
    element
        .value()
        .attr(attribute)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Presence of the dedicated selector when configured, the keyword heuristic
/// over title and description otherwise.
pub fn is_new_build(
    scope: ElementRef<'_>,
    profile: &SiteProfile,
    title: Option<&str>,
    description: Option<&str>,
) -> bool {
    match profile.selector(FieldName::NewBuild) {
        Some(selector) => parse_selector(selector)
            .map(|parsed| !matches(scope, &parsed).is_empty())
            .unwrap_or(false),
        None => {
            let text = format!("{} {}", title.unwrap_or(""), description.unwrap_or(""));
            contains_any(&text, &NEW_BUILD_KEYWORDS)
        }
    }
}

use thiserror::Error;
use url::Url;

use super::profile::FieldName;

/// A site profile that cannot be used. Raised while loading profiles, never
/// while parsing pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Site profile has an empty site id")]
    EmptySiteId,

    #[error("Site `{site}` has no selector for required field `{field}`")]
    MissingSelector { site: String, field: FieldName },

    #[error("Site `{0}` is configured more than once")]
    DuplicateSite(String),

    #[error("Unknown site `{0}`")]
    UnknownSite(String),

    #[error("Site `{site}` has an invalid base url `{url}`: {reason}")]
    InvalidBaseUrl {
        site: String,
        url: String,
        reason: String,
    },
}

/// The item wrapper selector could not be evaluated on a page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No items found for site `{site}` with selector `{selector}`: {reason}")]
pub struct NoItemsFoundError {
    pub site: String,
    pub selector: String,
    pub reason: String,
}

/// Why a single field could not be extracted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("no selector configured")]
    NotConfigured,

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("selector `{0}` matched nothing")]
    NoMatch(String),

    #[error("attribute `{attribute}` missing on `{selector}`")]
    MissingAttribute { selector: String, attribute: String },

    #[error("no number in `{0}`")]
    NotNumeric(String),
}

/// A required field failed for one item; the item is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("required field `{field}` failed: {cause}")]
pub struct RequiredFieldError {
    pub field: FieldName,
    #[source]
    pub cause: FieldError,
}

/// Fatal outcome of a whole parse
#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    NoItems(#[from] NoItemsFoundError),

    #[error("Failed to fetch {url}")]
    Fetch {
        url: Url,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

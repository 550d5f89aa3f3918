use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use url::Url;

use super::date_format::DateFormat;
use super::error::ConfigurationError;

/// Every field a profile can provide a selector for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum FieldName {
    AdWrapper,
    NextPage,
    Url,
    Price,
    Area,
    RoomsCount,
    ExternalId,
    Location,
    PublishedAt,
    Title,
    Description,
    Photo,
    RealEstateAgent,
    NewBuild,
}

impl FieldName {
    /// Fields whose selector must be configured for a profile to load
    pub const REQUIRED: [FieldName; 5] = [
        FieldName::Url,
        FieldName::Price,
        FieldName::Area,
        FieldName::RoomsCount,
        FieldName::AdWrapper,
    ];

    pub const ALL: [FieldName; 14] = [
        FieldName::AdWrapper,
        FieldName::NextPage,
        FieldName::Url,
        FieldName::Price,
        FieldName::Area,
        FieldName::RoomsCount,
        FieldName::ExternalId,
        FieldName::Location,
        FieldName::PublishedAt,
        FieldName::Title,
        FieldName::Description,
        FieldName::Photo,
        FieldName::RealEstateAgent,
        FieldName::NewBuild,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::AdWrapper => "ad_wrapper",
            FieldName::NextPage => "next_page",
            FieldName::Url => "url",
            FieldName::Price => "price",
            FieldName::Area => "area",
            FieldName::RoomsCount => "rooms_count",
            FieldName::ExternalId => "external_id",
            FieldName::Location => "location",
            FieldName::PublishedAt => "published_at",
            FieldName::Title => "title",
            FieldName::Description => "description",
            FieldName::Photo => "photo",
            FieldName::RealEstateAgent => "real_estate_agent",
            FieldName::NewBuild => "new_build",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown field `{}`", s))
    }
}

impl TryFrom<String> for FieldName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Raw profile as written in the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteProfileDef {
    pub site_id: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub published_at_format: String,
    #[serde(default)]
    pub selectors: HashMap<FieldName, String>,
}

/// Validated, immutable configuration for one listing site
#[derive(Debug, Clone)]
pub struct SiteProfile {
    site_id: String,
    selectors: HashMap<FieldName, String>,
    published_at_format: String,
    date_format: Option<DateFormat>,
    base_url: Option<Url>,
}

impl SiteProfile {
    /// Build a profile, rejecting it if a required selector is missing
    pub fn new<I, S>(
        site_id: impl Into<String>,
        selectors: I,
        published_at_format: impl Into<String>,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (FieldName, S)>,
        S: Into<String>,
    {
        let site_id = site_id.into().trim().to_string();
        if site_id.is_empty() {
            return Err(ConfigurationError::EmptySiteId);
        }

        let mut selectors: HashMap<FieldName, String> = selectors
            .into_iter()
            .map(|(field, selector)| (field, selector.into().trim().to_string()))
            .collect();
        selectors.retain(|_, selector| !selector.is_empty());

        if let Some(field) = FieldName::REQUIRED
            .iter()
            .find(|field| !selectors.contains_key(*field))
        {
            return Err(ConfigurationError::MissingSelector {
                site: site_id,
                field: *field,
            });
        }

        let published_at_format = published_at_format.into();
        let date_format = (!published_at_format.trim().is_empty())
            .then(|| DateFormat::new(&published_at_format));

        Ok(Self {
            site_id,
            selectors,
            published_at_format,
            date_format,
            base_url: None,
        })
    }

    /// Validate a profile read from the configuration file
    pub fn from_def(def: SiteProfileDef) -> Result<Self, ConfigurationError> {
        let profile = Self::new(def.site_id, def.selectors, def.published_at_format)?;
        match def.base_url {
            Some(base_url) if !base_url.trim().is_empty() => profile.with_base_url(&base_url),
            _ => Ok(profile),
        }
    }

    /// Set the URL relative links are resolved against when the current page
    /// URL is unknown.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigurationError> {
        let url = Url::parse(base_url.trim()).map_err(|e| ConfigurationError::InvalidBaseUrl {
            site: self.site_id.clone(),
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// The configured selector, or `None` if the site does not support it
    pub fn selector(&self, field: FieldName) -> Option<&str> {
        self.selectors.get(&field).map(String::as_str)
    }

    pub fn published_at_format(&self) -> &str {
        &self.published_at_format
    }

    pub fn date_format(&self) -> Option<&DateFormat> {
        self.date_format.as_ref()
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}

/// All configured site profiles, keyed by site id
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    profiles: HashMap<String, SiteProfile>,
}

impl SiteRegistry {
    /// Validate every definition; the first invalid one aborts loading
    pub fn from_defs(defs: Vec<SiteProfileDef>) -> Result<Self, ConfigurationError> {
        let mut profiles = HashMap::with_capacity(defs.len());
        for def in defs {
            let profile = SiteProfile::from_def(def)?;
            if profiles.contains_key(profile.site_id()) {
                return Err(ConfigurationError::DuplicateSite(
                    profile.site_id().to_string(),
                ));
            }
            profiles.insert(profile.site_id().to_string(), profile);
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, site_id: &str) -> Result<&SiteProfile, ConfigurationError> {
        self.profiles
            .get(site_id)
            .ok_or_else(|| ConfigurationError::UnknownSite(site_id.to_string()))
    }

    /// Site ids in alphabetical order
    pub fn site_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

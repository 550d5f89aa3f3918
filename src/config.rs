use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::scrapers::error::ConfigurationError;
use crate::scrapers::profile::{SiteProfileDef, SiteRegistry};

/// Which page fetcher loads result pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    Chrome,
    Http,
}

/// Page fetcher settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Fetcher used when the command line doesn't pick one (default: chrome)
    pub kind: FetcherKind,

    /// Run Chrome without a window (default: true)
    pub headless: bool,

    /// Navigation and request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Wait after navigation for client-side rendering, in milliseconds (default: 2000)
    pub settle_ms: u64,

    /// Click the cookie consent button when one is found (default: true)
    pub accept_cookies: bool,

    pub user_agent: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            kind: FetcherKind::Chrome,
            headless: true,
            timeout_secs: 30,
            settle_ms: 2000,
            accept_cookies: true,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub sites: Vec<SiteProfileDef>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// Validate every site profile
    pub fn registry(&self) -> Result<SiteRegistry, ConfigError> {
        Ok(SiteRegistry::from_defs(self.sites.clone())?)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid site profile: {0}")]
    Profile(#[from] ConfigurationError),
}

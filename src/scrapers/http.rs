use crate::config::FetcherConfig;
use crate::scrapers::traits::PageFetcher;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;

/// Plain HTTP page fetcher for sites that serve listings in the initial HTML
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout());
        if let Some(user_agent) = config.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let html = response.text().context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

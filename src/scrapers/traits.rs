use crate::models::ListingRecord;
use anyhow::Result;
use async_trait::async_trait;
use url::Url;

/// Loads result pages for the pagination loop.
/// Implementations block until the page is fully loaded and own any timeout policy.
pub trait PageFetcher {
    /// Fetch `url` and return the rendered page source
    fn fetch(&mut self, url: &Url) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &mut F {
    fn fetch(&mut self, url: &Url) -> Result<String> {
        (**self).fetch(url)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch(&mut self, url: &Url) -> Result<String> {
        (**self).fetch(url)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Destination for parsed listings
#[async_trait]
pub trait ListingSink: Send + Sync {
    /// Persist a batch of listings
    async fn write(&self, listings: &[ListingRecord]) -> Result<()>;
}

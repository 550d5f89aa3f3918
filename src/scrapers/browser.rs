use crate::config::FetcherConfig;
use crate::scrapers::traits::PageFetcher;
use anyhow::{anyhow, Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};
use url::Url;

/// Dismisses the usual cookie consent banners so they don't hide the results
const ACCEPT_COOKIES_SCRIPT: &str = r#"
    const button = document.querySelector(
        'button[id*="accept"], button[id*="didomi-notice-agree"], button[id*="consent"]'
    );
    if (button) button.click();
"#;

/// Page fetcher backed by headless Chrome, for sites that render listings client-side.
/// One browser and one tab live for the whole parse; the tab is closed on drop.
pub struct ChromeFetcher {
    // Keeps the Chrome process alive for as long as the tab is in use
    _browser: Browser,
    tab: Arc<Tab>,
    config: FetcherConfig,
    wait_for: Option<String>,
}

impl ChromeFetcher {
    /// Launch headless Chrome and open the tab used for every navigation
    pub fn new(config: FetcherConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .idle_browser_timeout(config.timeout())
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_default_timeout(config.timeout());

        if let Some(user_agent) = config.user_agent.as_deref() {
            tab.set_user_agent(user_agent, None, None)
                .context("Failed to set user agent")?;
        }

        Ok(Self {
            _browser: browser,
            tab,
            config,
            wait_for: None,
        })
    }

    /// Wait for `selector` (usually the item wrapper) before reading the page
    pub fn wait_for(mut self, selector: impl Into<String>) -> Self {
        self.wait_for = Some(selector.into());
        self
    }
}

impl PageFetcher for ChromeFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url.as_str())
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {} did not finish", url))?;

        if let Some(selector) = &self.wait_for {
            if let Err(e) = self.tab.wait_for_element(selector) {
                // Rendering may still be fine; extraction decides what the page holds
                warn!("Element {} did not appear on {}: {}", selector, url, e);
            }
        }

        if self.config.accept_cookies {
            let _ = self.tab.evaluate(ACCEPT_COOKIES_SCRIPT, false);
        }

        // Let client-side rendering settle
        thread::sleep(self.config.settle());

        let html = self
            .tab
            .get_content()
            .with_context(|| format!("Failed to read page source of {}", url))?;

        if html.is_empty() {
            return Err(anyhow!("Empty page source for {}", url));
        }

        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}

impl Drop for ChromeFetcher {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!("Failed to close browser tab: {}", e);
        }
    }
}

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::fields::parse_selector;
use super::profile::{FieldName, SiteProfile};
use super::traits::PageFetcher;

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// One result page
pub struct Page {
    pub document: Html,
    /// Where the page was loaded from, when known
    pub url: Option<Url>,
}

/// Lazy, non-restartable sequence of result pages
pub struct PageTraversal<'p, F: PageFetcher> {
    profile: &'p SiteProfile,
    fetcher: F,
    current: Option<Page>,
    next_url: Option<Url>,
    pages_visited: usize,
}

impl<'p, F: PageFetcher> PageTraversal<'p, F> {
    pub fn new(document: Html, page_url: Option<Url>, profile: &'p SiteProfile, fetcher: F) -> Self {
        Self {
            profile,
            fetcher,
            current: Some(Page {
                document,
                url: page_url,
            }),
            next_url: None,
            pages_visited: 0,
        }
    }

    /// Number of pages yielded so far
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    fn fetch(&mut self, url: Url) -> Option<Page> {
        info!(
            site = %self.profile.site_id(),
            page = self.pages_visited + 1,
            url = %url,
            fetcher = self.fetcher.name(),
            "Fetching next page"
        );
        match self.fetcher.fetch(&url) {
            Ok(source) => Some(Page {
                document: Html::parse_document(&source),
                url: Some(url),
            }),
            Err(e) => {
                warn!(
                    site = %self.profile.site_id(),
                    url = %url,
                    error = %format!("{:#}", e),
                    "Failed to fetch next page, stopping pagination"
                );
                None
            }
        }
    }

    /// Resolve the next-page link of `page`, if any
    fn next_link(&self, page: &Page) -> Option<Url> {
        let site = self.profile.site_id();
        let selector = self.profile.selector(FieldName::NextPage)?;
        let parsed = match parse_selector(selector) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(site = %site, error = %e, "Next page selector unusable");
                return None;
            }
        };

        let Some(element) = page.document.select(&parsed).next() else {
            debug!(site = %site, "No next page link, last page reached");
            return None;
        };
        let href = link_href(element)?;

        let base = page.url.as_ref().or(self.profile.base_url());
        let resolved = match base {
            Some(base) => base.join(href),
            None => Url::parse(href),
        };
        match resolved {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(site = %site, href = %href, error = %e, "Next page link not resolvable");
                None
            }
        }
    }
}

/// `href` of the element, or of the first link inside it
fn link_href(element: ElementRef<'_>) -> Option<&str> {
    element
        .value()
        .attr("href")
        .or_else(|| {
            element
                .select(&LINK_SELECTOR)
                .next()
                .and_then(|link| link.value().attr("href"))
        })
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
}

impl<F: PageFetcher> Iterator for PageTraversal<'_, F> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        let page = match self.current.take() {
            Some(page) => page,
            None => {
                let url = self.next_url.take()?;
                self.fetch(url)?
            }
        };
        self.next_url = self.next_link(&page);
        self.pages_visited += 1;
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::StubFetcher;

    fn profile(next_page: &str) -> SiteProfile {
        SiteProfile::new(
            "demo",
            [
                (FieldName::AdWrapper, "li.ad"),
                (FieldName::Url, "a"),
                (FieldName::Price, ".price"),
                (FieldName::Area, ".area"),
                (FieldName::RoomsCount, ".rooms"),
                (FieldName::NextPage, next_page),
            ],
            "",
        )
        .unwrap()
    }

    fn page(marker: &str, next: Option<&str>) -> String {
        let next = next
            .map(|href| format!(r#"<nav class="pager"><a class="next" href="{href}">Suivant</a></nav>"#))
            .unwrap_or_default();
        format!(r#"<html><body><h1>{marker}</h1>{next}</body></html>"#)
    }

    fn marker(page: &Page) -> String {
        let h1 = Selector::parse("h1").unwrap();
        page.document.select(&h1).next().unwrap().text().collect()
    }

    #[test]
    fn test_follows_next_links_until_last_page() {
        let profile = profile("a.next");
        let mut fetcher = StubFetcher::new()
            .with_page("https://immo.example/list?page=2", page("two", Some("?page=3")))
            .with_page("https://immo.example/list?page=3", page("three", None));
        let start = Url::parse("https://immo.example/list?page=1").unwrap();
        let first = Html::parse_document(&page("one", Some("/list?page=2")));

        let mut traversal = PageTraversal::new(first, Some(start), &profile, &mut fetcher);
        let markers: Vec<String> = traversal.by_ref().map(|page| marker(&page)).collect();
        assert_eq!(markers, vec!["one", "two", "three"]);
        assert_eq!(traversal.pages_visited(), 3);
        drop(traversal);

        assert_eq!(
            fetcher.requested(),
            vec![
                "https://immo.example/list?page=2",
                "https://immo.example/list?page=3"
            ]
        );
    }

    #[test]
    fn test_next_page_is_fetched_lazily() {
        let profile = profile("a.next");
        let mut fetcher = StubFetcher::new().with_page("https://immo.example/2", page("two", None));
        let first = Html::parse_document(&page("one", Some("https://immo.example/2")));

        let mut traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert!(traversal.next().is_some());
        drop(traversal);
        assert!(fetcher.requested().is_empty());
    }

    #[test]
    fn test_empty_next_selector_visits_one_page() {
        let profile = profile("");
        let mut fetcher = StubFetcher::new();
        let first = Html::parse_document(&page("one", Some("https://immo.example/2")));

        let traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert_eq!(traversal.count(), 1);
        assert!(fetcher.requested().is_empty());
    }

    #[test]
    fn test_malformed_next_selector_ends_traversal() {
        let profile = profile("a..next");
        let mut fetcher = StubFetcher::new();
        let first = Html::parse_document(&page("one", Some("https://immo.example/2")));

        let traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert_eq!(traversal.count(), 1);
        assert!(fetcher.requested().is_empty());
    }

    #[test]
    fn test_container_selector_uses_inner_link() {
        let profile = profile("nav.pager").with_base_url("https://immo.example/").unwrap();
        let mut fetcher = StubFetcher::new().with_page("https://immo.example/p2", page("two", None));
        let first = Html::parse_document(&page("one", Some("p2")));

        let traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert_eq!(traversal.count(), 2);
    }

    #[test]
    fn test_relative_link_without_base_stops() {
        let profile = profile("a.next");
        let mut fetcher = StubFetcher::new();
        let first = Html::parse_document(&page("one", Some("/list?page=2")));

        let traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert_eq!(traversal.count(), 1);
    }

    #[test]
    fn test_fetch_failure_ends_traversal() {
        let profile = profile("a.next");
        let mut fetcher = StubFetcher::new();
        let first = Html::parse_document(&page("one", Some("https://immo.example/2")));

        let traversal = PageTraversal::new(first, None, &profile, &mut fetcher);
        assert_eq!(traversal.count(), 1);
        assert_eq!(fetcher.requested(), vec!["https://immo.example/2"]);
    }
}

//! Pagination controller for the search stage
//!
//! Pages are fetched strictly one at a time, with a randomized pause after
//! every page, to keep the request rate low.

use crate::crawler::Fetcher;
use crate::delay::DelayRange;
use crate::extract::parse_search_page;
use crate::record::SearchResultItem;
use crate::url::build_search_url;

/// Settings for walking search result pages
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Scheme and host of the site
    pub base_url: String,

    /// Pause taken after each page, including the last
    pub page_delay: DelayRange,
}

/// Outcome of the search stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Pages whose fetch succeeded (1-based)
    pub pages_fetched: Vec<u32>,

    /// Pages skipped after exhausting retries (1-based)
    pub pages_skipped: Vec<u32>,

    /// Items appended to the accumulator
    pub items_found: usize,
}

impl SearchReport {
    pub fn pages_requested(&self) -> usize {
        self.pages_fetched.len() + self.pages_skipped.len()
    }

    pub fn is_complete(&self) -> bool {
        self.pages_skipped.is_empty()
    }
}

/// Fetches search pages `1..=page_count` and appends their items to `items`
///
/// A page that cannot be fetched is logged and skipped; the run continues
/// with the next page. Items are appended as each page is parsed, so a
/// caller that abandons this future keeps every page finished so far.
///
/// Duplicate identifiers across pages are kept as-is.
pub async fn search_pages(
    fetcher: &Fetcher,
    settings: &SearchSettings,
    query: &str,
    page_count: u32,
    items: &mut Vec<SearchResultItem>,
) -> SearchReport {
    let mut report = SearchReport::default();

    for page in 1..=page_count {
        let url = build_search_url(&settings.base_url, query, page);
        tracing::info!(page, %url, "Fetching search page");

        match fetcher.fetch(&url).await {
            Ok(html) => {
                let found = parse_search_page(&html, &settings.base_url);
                tracing::info!(page, products = found.len(), "Found products on page");
                report.items_found += found.len();
                report.pages_fetched.push(page);
                items.extend(found);
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Failed to fetch search page, skipping");
                report.pages_skipped.push(page);
            }
        }

        let pause = settings.page_delay.sleep().await;
        tracing::debug!(page, ?pause, "Paused after search page");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityPool, IdentityProfile};
    use crate::retry::RetryPolicy;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher() -> Fetcher {
        Fetcher::new(
            IdentityPool::new(vec![IdentityProfile::new("TestAgent/1.0")]),
            RetryPolicy::fixed(2, Duration::ZERO),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn settings(base_url: String) -> SearchSettings {
        SearchSettings {
            base_url,
            page_delay: DelayRange::none(),
        }
    }

    fn cards(ids: &[&str]) -> String {
        let body: String = ids
            .iter()
            .map(|id| format!(r#"<div data-asin="{}"><h2><a><span>{}</span></a></h2></div>"#, id, id))
            .collect();
        format!("<html><body>{}</body></html>", body)
    }

    #[tokio::test]
    async fn test_pages_accumulate_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("k", "usb hub"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cards(&["A1", "A2"])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cards(&["A2", "A3"])))
            .mount(&server)
            .await;

        let mut items = Vec::new();
        let report = search_pages(
            &test_fetcher(),
            &settings(server.uri()),
            "usb hub",
            2,
            &mut items,
        )
        .await;

        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "A2", "A2", "A3"]);
        assert_eq!(report.pages_fetched, vec![1, 2]);
        assert!(report.is_complete());
        assert_eq!(report.items_found, 4);
        assert_eq!(items[0].url, format!("{}/dp/A1", server.uri()));
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cards(&["B1"])))
            .mount(&server)
            .await;

        let mut items = Vec::new();
        let report = search_pages(
            &test_fetcher(),
            &settings(server.uri()),
            "mouse",
            2,
            &mut items,
        )
        .await;

        assert_eq!(items.len(), 1);
        assert_eq!(report.pages_skipped, vec![1]);
        assert_eq!(report.pages_fetched, vec![2]);
        assert_eq!(report.pages_requested(), 2);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_zero_pages_fetches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut items = Vec::new();
        let report = search_pages(
            &test_fetcher(),
            &settings(server.uri()),
            "mouse",
            0,
            &mut items,
        )
        .await;

        assert!(items.is_empty());
        assert_eq!(report.pages_requested(), 0);
    }
}

//! Shared fixtures for the integration tests

use async_trait::async_trait;
use listing_harvester::config::Config;
use listing_harvester::crawler::{RenderSession, Renderer};
use listing_harvester::RenderError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-memory renderer serving fixed documents by URL
///
/// Unknown URLs fail navigation.
#[derive(Clone, Default)]
pub struct MockRenderer {
    pages: Arc<HashMap<String, String>>,
    shut_down: Arc<AtomicBool>,
}

impl MockRenderer {
    pub fn new(pages: Vec<(String, String)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            shut_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag set once the renderer has been shut down
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shut_down)
    }
}

pub struct MockSession {
    pages: Arc<HashMap<String, String>>,
    current: Option<String>,
}

#[async_trait]
impl RenderSession for MockSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        match self.pages.get(url) {
            Some(html) => {
                self.current = Some(html.clone());
                Ok(())
            }
            None => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.current.clone().ok_or_else(|| RenderError::Content {
            url: String::new(),
            message: "nothing rendered".to_string(),
        })
    }

    async fn close(self) -> Result<(), RenderError> {
        Ok(())
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    type Session = MockSession;

    async fn open_session(&self) -> Result<MockSession, RenderError> {
        Ok(MockSession {
            pages: Arc::clone(&self.pages),
            current: None,
        })
    }

    async fn shutdown(self) -> Result<(), RenderError> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration pointed at `base_url` with every pause disabled
pub fn fast_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.search.retry_delay_ms = 0;
    config.search.page_delay_min_ms = 0;
    config.search.page_delay_max_ms = 0;
    config.detail.dwell_min_ms = 0;
    config.detail.dwell_max_ms = 0;
    config.output.retry_delay_ms = 0;
    config
}

/// Search results page with one card per identifier
pub fn search_page(ids: &[String]) -> String {
    let cards: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<div data-asin="{id}" class="s-result-item">
                    <h2><a href="/dp/{id}"><span>Wireless Mouse {id}</span></a></h2>
                    <span class="a-price"><span class="a-offscreen">$19.99</span></span>
                </div>"#
            )
        })
        .collect();
    format!("<html><body><div class=\"s-main-slot\">{}</div></body></html>", cards)
}

/// Product page with a title, price, rating and two gallery images
pub fn product_page(title: &str) -> String {
    format!(
        r#"<html><body>
            <span id="productTitle"> {title} </span>
            <span class="a-price"><span class="a-offscreen">$24.99</span></span>
            <i class="a-icon-star"><span>4.5 out of 5 stars</span></i>
            <span id="acrCustomerReviewText">1,234 ratings</span>
            <div id="availability"><span>In Stock</span></div>
            <div id="altImages">
                <img src="https://m.media-amazon.com/images/I/71a._SS40_.jpg">
                <img src="https://m.media-amazon.com/images/I/71b._SR38,50_.jpg">
            </div>
        </body></html>"#
    )
}

//! Extraction of structured fields from parsed HTML
//!
//! Two profiles exist:
//! - search-result cards (`parse_search_page`)
//! - product detail pages (`parse_product_page`)
//!
//! Every lookup is null-safe: a selector that matches nothing yields `None`
//! for that field and never aborts the rest of the extraction.

mod detail;
mod images;
mod search;

pub use detail::parse_product_page;
pub use images::normalize_image_url;
pub use search::parse_search_page;

use scraper::{ElementRef, Selector};

/// Returns the trimmed text of the first element matching `css` under `scope`
///
/// Empty text counts as no match.
pub(crate) fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    scope
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Tries each selector in order and returns the first non-empty text
pub(crate) fn first_text_of(scope: ElementRef<'_>, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|css| first_text(scope, css))
}

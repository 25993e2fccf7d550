//! URL construction for search pages and product pages
//!
//! Both URLs are pure functions of their inputs: the search URL of the query
//! and page index, the product URL of the site-assigned identifier.

use url::form_urlencoded;

/// Builds the URL of one search results page
///
/// The query is form-encoded (spaces become `+`) and the page index is
/// 1-based.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::build_search_url;
///
/// let url = build_search_url("https://www.amazon.com", "wireless mouse", 2);
/// assert_eq!(url, "https://www.amazon.com/s?k=wireless+mouse&page=2");
/// ```
pub fn build_search_url(base_url: &str, query: &str, page: u32) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}/s?k={}&page={}", trim_base(base_url), encoded, page)
}

/// Derives the canonical product URL from its identifier
///
/// # Examples
///
/// ```
/// use listing_harvester::url::canonical_product_url;
///
/// let url = canonical_product_url("https://www.amazon.com", "B08N5WRWNW");
/// assert_eq!(url, "https://www.amazon.com/dp/B08N5WRWNW");
/// ```
pub fn canonical_product_url(base_url: &str, id: &str) -> String {
    format!("{}/dp/{}", trim_base(base_url), id)
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

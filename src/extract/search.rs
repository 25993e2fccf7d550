//! Search-result card extraction

use crate::extract::first_text;
use crate::record::SearchResultItem;
use crate::url::canonical_product_url;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Attribute carrying the site-assigned product identifier
const ID_ATTR: &str = "data-asin";

const TITLE_SELECTOR: &str = "h2 a span";
const PRICE_SELECTOR: &str = "span.a-price span.a-offscreen";

/// Parses a search results page into one item per identified product card
///
/// # Extraction Rules
///
/// - Every element carrying `data-asin` is a candidate card
/// - A blank identifier skips the element; it is not an error
/// - An identifier already seen on this page is skipped, so identifiers in
///   the output are unique per page
/// - Title and price are optional; the URL is derived from the identifier
///
/// Items come back in document order.
///
/// # Example
///
/// ```
/// use listing_harvester::extract::parse_search_page;
///
/// let html = r#"<div data-asin="B01"><h2><a><span>Mouse</span></a></h2></div>"#;
/// let items = parse_search_page(html, "https://www.amazon.com");
/// assert_eq!(items[0].url, "https://www.amazon.com/dp/B01");
/// ```
pub fn parse_search_page(html: &str, base_url: &str) -> Vec<SearchResultItem> {
    let document = Html::parse_document(html);
    let Ok(card_selector) = Selector::parse(&format!("[{}]", ID_ATTR)) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for card in document.select(&card_selector) {
        let id = card.value().attr(ID_ATTR).unwrap_or("").trim();
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }

        items.push(SearchResultItem {
            id: id.to_string(),
            title: first_text(card, TITLE_SELECTOR),
            url: canonical_product_url(base_url, id),
            price: first_text(card, PRICE_SELECTOR),
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://www.amazon.com";

    fn card(id: &str, title: Option<&str>, price: Option<&str>) -> String {
        let title = title
            .map(|t| format!("<h2><a href=\"/x\"><span>{}</span></a></h2>", t))
            .unwrap_or_default();
        let price = price
            .map(|p| {
                format!(
                    "<span class=\"a-price\"><span class=\"a-offscreen\">{}</span></span>",
                    p
                )
            })
            .unwrap_or_default();
        format!("<div data-asin=\"{}\">{}{}</div>", id, title, price)
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body>{}</body></html>", cards.concat())
    }

    #[test]
    fn test_full_card() {
        let html = page(&[card("B0001", Some("Wireless Mouse"), Some("$24.99"))]);
        let items = parse_search_page(&html, SITE);

        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0],
            SearchResultItem {
                id: "B0001".to_string(),
                title: Some("Wireless Mouse".to_string()),
                url: "https://www.amazon.com/dp/B0001".to_string(),
                price: Some("$24.99".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_title_and_price_are_none() {
        let html = page(&[card("B0002", None, None)]);
        let items = parse_search_page(&html, SITE);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, None);
        assert_eq!(items[0].price, None);
    }

    #[test]
    fn test_blank_identifier_skipped() {
        let html = page(&[
            card("", Some("Sponsored"), None),
            card("   ", Some("Spacer"), None),
            card("B0003", Some("Real"), None),
        ]);
        let items = parse_search_page(&html, SITE);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "B0003");
    }

    #[test]
    fn test_identifier_is_trimmed() {
        let html = page(&[card("  B0004 ", None, None)]);
        let items = parse_search_page(&html, SITE);
        assert_eq!(items[0].id, "B0004");
        assert_eq!(items[0].url, "https://www.amazon.com/dp/B0004");
    }

    #[test]
    fn test_document_order_and_unique_ids() {
        let html = page(&[
            card("C", None, None),
            card("A", None, None),
            card("C", Some("dup"), None),
            card("B", None, None),
        ]);
        let items = parse_search_page(&html, SITE);
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(items[0].title, None);
    }

    #[test]
    fn test_no_cards() {
        let items = parse_search_page("<html><body><p>No results</p></body></html>", SITE);
        assert!(items.is_empty());
    }

    #[test]
    fn test_twenty_cards() {
        let cards: Vec<String> = (1..=20)
            .map(|n| card(&format!("A{}", n), Some(&format!("Item {}", n)), Some("$1.00")))
            .collect();
        let items = parse_search_page(&page(&cards), SITE);

        assert_eq!(items.len(), 20);
        assert_eq!(items[19].id, "A20");
        assert!(items.iter().all(|i| !i.id.is_empty()));
    }
}

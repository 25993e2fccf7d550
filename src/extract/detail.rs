//! Product detail page extraction

use crate::extract::{first_text, first_text_of, normalize_image_url};
use crate::record::ProductDetail;
use scraper::{Html, Selector};

const TITLE_SELECTOR: &str = "#productTitle";

/// Current price element, then the legacy "our price" and "deal price" blocks
const PRICE_CHAIN: [&str; 3] = [
    "span.a-price span.a-offscreen",
    "#priceblock_ourprice",
    "#priceblock_dealprice",
];

/// Labeled rating element, then the star icon's hidden text
const RATING_CHAIN: [&str; 2] = ["span[data-asin][data-asin-rating]", "i.a-icon-star span"];

const REVIEW_COUNT_SELECTOR: &str = "#acrCustomerReviewText";
const AVAILABILITY_SELECTOR: &str = "#availability";
const GALLERY_IMAGE_SELECTOR: &str = "#altImages img";

/// Extracts the detail fields of a rendered product page
///
/// Every field is looked up independently; the first selector of a fallback
/// chain that yields text wins, and a field with no match is `None`.
pub fn parse_product_page(html: &str) -> ProductDetail {
    let document = Html::parse_document(html);
    let root = document.root_element();

    ProductDetail {
        title: first_text(root, TITLE_SELECTOR),
        price: first_text_of(root, &PRICE_CHAIN),
        rating: first_text_of(root, &RATING_CHAIN),
        review_count: first_text(root, REVIEW_COUNT_SELECTOR),
        availability: first_text(root, AVAILABILITY_SELECTOR),
        images: extract_images(&document),
    }
}

/// Collects gallery image URLs in document order, without de-duplication
fn extract_images(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(GALLERY_IMAGE_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.trim().is_empty())
        .map(|src| normalize_image_url(src.trim()))
        .collect()
}

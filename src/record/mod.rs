//! Record types flowing through the pipeline
//!
//! - `SearchResultItem`: one product card from a search results page
//! - `ProductDetail`: fields extracted from a rendered product page
//! - `EnrichedRecord`: a search item together with either its detail or the
//!   reason enrichment failed
//!
//! Records flatten into ordered rows (see [`row`]) only when they are written.

pub mod row;

pub use row::{FieldValue, Row, Table, Tabular};

use std::fmt;

/// A product card discovered on a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    /// Site-assigned product identifier, never empty
    pub id: String,

    /// Card title, if the card carried one
    pub title: Option<String>,

    /// Canonical product URL derived from `id`
    pub url: String,

    /// Displayed price, kept as the site formats it
    pub price: Option<String>,
}

/// Fields extracted from a product detail page
///
/// Each field is independent: a missing rating never hides the price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDetail {
    pub title: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<String>,
    pub availability: Option<String>,

    /// Full-resolution gallery image URLs in document order
    pub images: Vec<String>,
}

/// Why a search item could not be enriched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The item has no URL to render
    NoUrl,

    /// Rendering or extraction failed
    Failed,
}

impl FailureReason {
    /// The error marker written to the output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoUrl => "no_url",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of enriching one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Detail(ProductDetail),
    Failure(FailureReason),
}

/// A search item plus the outcome of its detail stage
///
/// Created once per item by the detail orchestrator and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub item: SearchResultItem,
    pub enrichment: Enrichment,
}

impl EnrichedRecord {
    pub fn enriched(item: SearchResultItem, detail: ProductDetail) -> Self {
        Self {
            item,
            enrichment: Enrichment::Detail(detail),
        }
    }

    pub fn failed(item: SearchResultItem, reason: FailureReason) -> Self {
        Self {
            item,
            enrichment: Enrichment::Failure(reason),
        }
    }

    /// Returns the failure reason, if enrichment failed
    pub fn failure(&self) -> Option<FailureReason> {
        match &self.enrichment {
            Enrichment::Failure(reason) => Some(*reason),
            Enrichment::Detail(_) => None,
        }
    }

    /// Returns true if detail fields were extracted
    pub fn is_enriched(&self) -> bool {
        matches!(self.enrichment, Enrichment::Detail(_))
    }
}

/// Keeps the first occurrence of each product identifier
///
/// Returns the number of items removed.
pub fn dedupe_by_id(items: &mut Vec<SearchResultItem>) -> usize {
    let before = items.len();
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.id.clone()));
    before - items.len()
}

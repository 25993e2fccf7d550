//! Harvest pipeline
//!
//! This module contains the stages of a run and the driver tying them
//! together:
//! - HTTP fetching of search pages with retry and identity rotation
//! - Sequential pagination over search results
//! - Concurrent rendering and enrichment of product pages
//! - Run coordination with interrupt handling and partial saves

mod coordinator;
mod fetcher;
mod orchestrator;
mod pagination;
mod renderer;

pub use coordinator::{Harvest, HarvestRequest};
pub use fetcher::{build_http_client, Fetcher};
pub use orchestrator::{enrich, DetailSettings, EnrichReport};
pub use pagination::{search_pages, SearchReport, SearchSettings};
pub use renderer::{ChromiumOptions, ChromiumRenderer, ChromiumSession, RenderSession, Renderer};

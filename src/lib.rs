//! Listing-Harvester: a resilient product listing scraper
//!
//! This crate retrieves paginated search results from an e-commerce site,
//! renders each product's detail page in a headless browser, extracts
//! structured fields with fallbacks, and saves everything to a CSV, JSON
//! or XLSX file without losing partial work.

pub mod config;
pub mod crawler;
pub mod delay;
pub mod extract;
pub mod identity;
pub mod output;
pub mod record;
pub mod retry;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a single HTTP fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors raised by the rendering session
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open browser tab: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Failed to read rendered document of {url}: {message}")]
    Content { url: String, message: String },

    #[error("Rendering {url} timed out after {limit:?}")]
    Timeout { url: String, limit: Duration },

    #[error("Browser shutdown failed: {0}")]
    Shutdown(String),
}

// Re-export commonly used types
pub use config::Config;
pub use record::{EnrichedRecord, FailureReason, ProductDetail, SearchResultItem};

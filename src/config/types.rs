use crate::crawler::{DetailSettings, SearchSettings};
use crate::delay::DelayRange;
use crate::identity::{IdentityPool, IdentityProfile};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Listing-Harvester
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub search: SearchConfig,
    pub detail: DetailConfig,
    pub output: OutputConfig,
    #[serde(rename = "identity")]
    pub identities: Vec<IdentityProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            search: SearchConfig::default(),
            detail: DetailConfig::default(),
            output: OutputConfig::default(),
            identities: IdentityProfile::defaults(),
        }
    }
}

impl Config {
    /// Builds the identity pool handed to the fetcher and renderer
    pub fn identity_pool(&self) -> IdentityPool {
        IdentityPool::new(self.identities.clone())
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host of the site, e.g. `https://www.amazon.com`
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.amazon.com".to_string(),
        }
    }
}

/// Search stage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Total fetch attempts per results page
    pub max_attempts: u32,

    /// Pause between fetch attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Lower bound of the pause after each results page (milliseconds)
    pub page_delay_min_ms: u64,

    /// Upper bound of the pause after each results page (milliseconds)
    pub page_delay_max_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 3_000,
            request_timeout_secs: 20,
            page_delay_min_ms: 5_000,
            page_delay_max_ms: 10_000,
        }
    }
}

impl SearchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings for the pagination controller against `base_url`
    pub fn settings(&self, base_url: &str) -> SearchSettings {
        SearchSettings {
            base_url: base_url.to_string(),
            page_delay: DelayRange::from_millis(self.page_delay_min_ms, self.page_delay_max_ms),
        }
    }
}

/// Detail stage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetailConfig {
    /// Number of concurrent workers, each with its own browser tab
    pub concurrency: usize,

    /// Lower bound of the dwell time on a rendered page (milliseconds)
    pub dwell_min_ms: u64,

    /// Upper bound of the dwell time on a rendered page (milliseconds)
    pub dwell_max_ms: u64,

    /// Optional bound on each navigation and snapshot (seconds)
    pub render_timeout_secs: Option<u64>,

    /// Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,

    /// Launch the browser without its sandbox (needed in some containers)
    pub no_sandbox: bool,

    /// Drop repeated product identifiers before rendering
    pub dedupe: bool,
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            dwell_min_ms: 3_000,
            dwell_max_ms: 6_000,
            render_timeout_secs: None,
            chrome_executable: None,
            no_sandbox: false,
            dedupe: false,
        }
    }
}

impl DetailConfig {
    /// Settings for the detail orchestrator
    pub fn settings(&self) -> DetailSettings {
        DetailSettings {
            concurrency: self.concurrency,
            dwell: DelayRange::from_millis(self.dwell_min_ms, self.dwell_max_ms),
            render_timeout: self.render_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Total write attempts, each against a new filename
    pub max_attempts: u32,

    /// Pause between write attempts (milliseconds)
    pub retry_delay_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            retry_delay_ms: 500,
        }
    }
}

impl OutputConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

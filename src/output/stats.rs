//! Run summary reporting
//!
//! Collects the counts of a finished (or interrupted) harvest and prints
//! them to stdout once the run is over.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::process::ExitCode;

/// Final state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Every page fetched and every item enriched
    Complete,

    /// Output saved, but pages were skipped or items failed or were dropped
    Partial,

    /// Stopped by the user; whatever was collected was saved
    Interrupted,

    /// The writer could not save anything
    Unsaved,
}

impl RunStatus {
    /// Picks the status from the run's outcome
    ///
    /// A failed save outranks an interrupt, which outranks partial results.
    pub fn resolve(saved: bool, interrupted: bool, complete: bool) -> Self {
        match (saved, interrupted, complete) {
            (false, _, _) => RunStatus::Unsaved,
            (true, true, _) => RunStatus::Interrupted,
            (true, false, false) => RunStatus::Partial,
            (true, false, true) => RunStatus::Complete,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Unsaved => 1,
            RunStatus::Partial => 2,
            RunStatus::Interrupted => 130,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Complete => "complete",
            RunStatus::Partial => "partial",
            RunStatus::Interrupted => "interrupted",
            RunStatus::Unsaved => "unsaved",
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.exit_code())
    }
}

/// Counts and outcome of one harvest
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// SHA-256 of the configuration file, when one was loaded
    pub config_hash: Option<String>,

    pub query: String,

    /// Search pages attempted before the run ended
    pub pages_requested: usize,

    /// Search pages skipped after exhausting retries (1-based)
    pub pages_skipped: Vec<u32>,

    /// Search result items collected
    pub summaries: usize,

    /// Duplicate identifiers removed before the detail stage
    pub duplicates_removed: usize,

    pub enriched: usize,
    pub failed: usize,
    pub no_url: usize,

    /// Items lost to crashed detail workers
    pub dropped: usize,

    /// Rows in the saved file
    pub rows_saved: usize,

    /// File actually written, if any
    pub saved_path: Option<PathBuf>,

    pub status: RunStatus,
}

impl RunSummary {
    /// Creates an empty summary stamped with the current time
    pub fn new(query: impl Into<String>, config_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            config_hash,
            query: query.into(),
            pages_requested: 0,
            pages_skipped: Vec::new(),
            summaries: 0,
            duplicates_removed: 0,
            enriched: 0,
            failed: 0,
            no_url: 0,
            dropped: 0,
            rows_saved: 0,
            saved_path: None,
            status: RunStatus::Unsaved,
        }
    }

    pub fn duration_secs(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Run:");
    println!("  Query: {}", summary.query);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {}s", summary.duration_secs());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Search Stage:");
    println!("  Pages requested: {}", summary.pages_requested);
    if !summary.pages_skipped.is_empty() {
        let skipped: Vec<String> = summary.pages_skipped.iter().map(u32::to_string).collect();
        println!("  Pages skipped: {}", skipped.join(", "));
    }
    println!("  Products found: {}", summary.summaries);
    if summary.duplicates_removed > 0 {
        println!("  Duplicates removed: {}", summary.duplicates_removed);
    }
    println!();

    let attempted = summary.enriched + summary.failed + summary.no_url;
    if attempted > 0 || summary.dropped > 0 {
        println!("Detail Stage:");
        let rate = if attempted > 0 {
            (summary.enriched as f64 / attempted as f64) * 100.0
        } else {
            0.0
        };
        println!("  Enriched: {} ({:.1}%)", summary.enriched, rate);
        println!("  Failed: {}", summary.failed);
        println!("  No URL: {}", summary.no_url);
        if summary.dropped > 0 {
            println!("  Dropped: {}", summary.dropped);
        }
        println!();
    }

    match &summary.saved_path {
        Some(path) => println!("Saved {} rows to: {}", summary.rows_saved, path.display()),
        None => println!("Nothing was saved"),
    }
    println!("Status: {}", summary.status.as_str());
}

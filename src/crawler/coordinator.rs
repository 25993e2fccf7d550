//! Harvest coordinator - owns a run from first search page to saved file
//!
//! The coordinator:
//! - Walks the search pages into the summary accumulator
//! - Optionally drops repeated identifiers
//! - Enriches summaries into the record accumulator
//! - Races the stages against an interrupt signal
//! - Saves every record, plus each summary still without one, exactly once
//! - Shuts the renderer down on every path

use crate::config::Config;
use crate::crawler::{
    enrich, search_pages, DetailSettings, EnrichReport, Fetcher, Renderer, SearchReport,
    SearchSettings,
};
use crate::output::{ResultWriter, RunStatus, RunSummary};
use crate::record::{dedupe_by_id, EnrichedRecord, FailureReason, Row, SearchResultItem, Tabular};
use crate::FetchError;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

/// What to harvest and where to save it
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    /// Free-text search query
    pub query: String,

    /// Number of search result pages, starting at 1
    pub pages: u32,

    /// Requested output path; its extension selects the format
    pub out: PathBuf,
}

/// A single harvest run
pub struct Harvest<R: Renderer> {
    fetcher: Fetcher,
    renderer: R,
    writer: ResultWriter,
    search: SearchSettings,
    detail: DetailSettings,
    dedupe: bool,
    config_hash: Option<String>,
    summaries: Vec<SearchResultItem>,
    records: Vec<EnrichedRecord>,
    search_report: Option<SearchReport>,
    enrich_report: Option<EnrichReport>,
    duplicates_removed: usize,
}

impl<R: Renderer> Harvest<R> {
    /// Creates a run from `config`, taking ownership of `renderer`
    ///
    /// # Returns
    ///
    /// * `Ok(Harvest)` - Ready to run
    /// * `Err(FetchError)` - The HTTP client could not be built
    pub fn new(config: &Config, renderer: R) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(
            config.identity_pool(),
            config.search.retry_policy(),
            config.search.request_timeout(),
        )?;

        Ok(Self {
            fetcher,
            renderer,
            writer: ResultWriter::new(config.output.retry_policy()),
            search: config.search.settings(&config.site.base_url),
            detail: config.detail.settings(),
            dedupe: config.detail.dedupe,
            config_hash: None,
            summaries: Vec::new(),
            records: Vec::new(),
            search_report: None,
            enrich_report: None,
            duplicates_removed: 0,
        })
    }

    /// Attaches the configuration hash reported in the run summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Runs the pipeline until it finishes or `interrupt` resolves, then
    /// saves whatever was collected and releases the renderer
    ///
    /// Never fails: every outcome is described by the returned summary.
    pub async fn run<I>(mut self, request: HarvestRequest, interrupt: I) -> RunSummary
    where
        I: Future<Output = ()>,
    {
        let mut summary = RunSummary::new(request.query.clone(), self.config_hash.clone());
        tracing::info!(query = %request.query, pages = request.pages, "Starting harvest");

        let interrupted = tokio::select! {
            _ = self.collect(&request) => false,
            _ = interrupt => true,
        };
        if interrupted {
            tracing::warn!(
                summaries = self.summaries.len(),
                records = self.records.len(),
                "Interrupted, saving what was collected"
            );
        }

        let rows = saved_rows(&self.summaries, &self.records);
        let pending = rows.len() - self.records.len();
        if pending > 0 {
            tracing::info!(pending, "Saving search results that have no detail record");
        }
        let saved_path = self.writer.write(&rows, &request.out).await;
        let rows_saved = rows.len();

        if let Err(e) = self.renderer.shutdown().await {
            tracing::warn!(error = %e, "Renderer did not shut down cleanly");
        }

        let complete = self.search_report.as_ref().is_some_and(SearchReport::is_complete)
            && self.enrich_report.as_ref().is_some_and(EnrichReport::is_complete);

        summary.pages_requested = self
            .search_report
            .as_ref()
            .map_or(0, SearchReport::pages_requested);
        summary.pages_skipped = self
            .search_report
            .map(|report| report.pages_skipped)
            .unwrap_or_default();
        summary.summaries = self.summaries.len();
        summary.duplicates_removed = self.duplicates_removed;
        for record in &self.records {
            match record.failure() {
                None => summary.enriched += 1,
                Some(FailureReason::Failed) => summary.failed += 1,
                Some(FailureReason::NoUrl) => summary.no_url += 1,
            }
        }
        summary.dropped = self.enrich_report.map_or(0, |report| report.dropped);
        summary.rows_saved = if saved_path.is_some() { rows_saved } else { 0 };
        summary.status = RunStatus::resolve(saved_path.is_some(), interrupted, complete);
        summary.saved_path = saved_path;
        summary.finished_at = Utc::now();

        tracing::info!(status = summary.status.as_str(), "Harvest finished");
        summary
    }

    async fn collect(&mut self, request: &HarvestRequest) {
        let search_report = search_pages(
            &self.fetcher,
            &self.search,
            &request.query,
            request.pages,
            &mut self.summaries,
        )
        .await;
        tracing::info!(
            pages = search_report.pages_fetched.len(),
            skipped = search_report.pages_skipped.len(),
            products = self.summaries.len(),
            "Search stage finished"
        );
        self.search_report = Some(search_report);

        if self.dedupe {
            self.duplicates_removed = dedupe_by_id(&mut self.summaries);
            if self.duplicates_removed > 0 {
                tracing::info!(removed = self.duplicates_removed, "Dropped duplicate products");
            }
        }

        let enrich_report = enrich(
            &self.renderer,
            self.summaries.clone(),
            &self.detail,
            &mut self.records,
        )
        .await;
        self.enrich_report = Some(enrich_report);
    }
}

/// One row of the saved file
enum SavedRow<'a> {
    Record(&'a EnrichedRecord),
    Summary(&'a SearchResultItem),
}

impl Tabular for SavedRow<'_> {
    fn to_row(&self) -> Row {
        match self {
            SavedRow::Record(record) => record.to_row(),
            SavedRow::Summary(item) => item.to_row(),
        }
    }
}

/// Every record, followed by each summary that no record accounts for
///
/// Repeated identifiers are matched by count, so a summary listed twice
/// with one record still contributes one summary row.
fn saved_rows<'a>(
    summaries: &'a [SearchResultItem],
    records: &'a [EnrichedRecord],
) -> Vec<SavedRow<'a>> {
    let mut recorded: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *recorded.entry(record.item.id.as_str()).or_default() += 1;
    }

    let mut rows: Vec<SavedRow<'a>> = records.iter().map(SavedRow::Record).collect();
    for item in summaries {
        match recorded.get_mut(item.id.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => rows.push(SavedRow::Summary(item)),
        }
    }
    rows
}

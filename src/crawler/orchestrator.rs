//! Detail orchestrator - bounded concurrent enrichment of search items
//!
//! A fixed pool of workers drains a shared queue of search items. Each worker
//! owns one rendering session for its lifetime and, per item:
//! 1. Emits a `no_url` record when the item has no URL
//! 2. Navigates to the product page
//! 3. Dwells for a randomized interval
//! 4. Snapshots and parses the rendered document
//! 5. Emits an enriched record, or a `failed` record on any error
//!
//! Records are collected in completion order.

use crate::crawler::renderer::{RenderSession, Renderer};
use crate::delay::DelayRange;
use crate::extract::parse_product_page;
use crate::record::{EnrichedRecord, FailureReason, ProductDetail, SearchResultItem};
use crate::RenderError;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Settings for the detail stage
#[derive(Debug, Clone)]
pub struct DetailSettings {
    /// Number of workers, each with its own session
    pub concurrency: usize,

    /// Dwell time between navigation and snapshot
    pub dwell: DelayRange,

    /// Bound on navigation and on snapshot; `None` waits indefinitely
    pub render_timeout: Option<Duration>,
}

impl Default for DetailSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            dwell: DelayRange::from_millis(3_000, 6_000),
            render_timeout: None,
        }
    }
}

/// Outcome of the detail stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Items handed to the stage
    pub requested: usize,

    /// Records with extracted detail fields
    pub enriched: usize,

    /// Records marked `failed`
    pub failed: usize,

    /// Records marked `no_url`
    pub no_url: usize,

    /// Items lost to a crashed worker; never more than the worker count
    pub dropped: usize,

    /// Workers that could not open a session
    pub sessions_unavailable: usize,
}

impl EnrichReport {
    pub fn emitted(&self) -> usize {
        self.enriched + self.failed + self.no_url
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.no_url == 0 && self.dropped == 0
    }

    fn count(&mut self, record: &EnrichedRecord) {
        match record.failure() {
            None => self.enriched += 1,
            Some(FailureReason::Failed) => self.failed += 1,
            Some(FailureReason::NoUrl) => self.no_url += 1,
        }
    }
}

type Queue = Arc<Mutex<VecDeque<SearchResultItem>>>;

/// Enriches `items` with detail fields and appends one record per completed
/// item to `records`
///
/// Records are appended as workers finish them, so a caller that abandons
/// this future keeps every record produced so far (the worker tasks are
/// aborted with it).
///
/// # Failure Handling
///
/// - An item without a URL becomes a `no_url` record without rendering
/// - Any render, timeout or snapshot error becomes a `failed` record
/// - A worker that cannot open a session exits; items left in the queue once
///   every worker has exited become `failed` records
/// - A worker that panics loses its in-flight item, counted in `dropped`
pub async fn enrich<R: Renderer>(
    renderer: &R,
    items: Vec<SearchResultItem>,
    settings: &DetailSettings,
    records: &mut Vec<EnrichedRecord>,
) -> EnrichReport {
    let mut report = EnrichReport {
        requested: items.len(),
        ..EnrichReport::default()
    };
    if items.is_empty() {
        return report;
    }

    let worker_count = settings.concurrency.max(1).min(items.len());
    let queue: Queue = Arc::new(Mutex::new(items.into_iter().collect()));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut workers = JoinSet::new();

    for worker_id in 0..worker_count {
        match renderer.open_session().await {
            Ok(session) => {
                workers.spawn(run_worker(
                    worker_id,
                    session,
                    Arc::clone(&queue),
                    tx.clone(),
                    settings.clone(),
                ));
            }
            Err(e) => {
                tracing::warn!(worker_id, error = %e, "Could not open rendering session");
                report.sessions_unavailable += 1;
            }
        }
    }
    drop(tx);

    while let Some(record) = rx.recv().await {
        report.count(&record);
        records.push(record);
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Detail worker ended abnormally");
        }
    }

    let leftover: Vec<SearchResultItem> = queue.lock().await.drain(..).collect();
    if !leftover.is_empty() {
        tracing::warn!(
            count = leftover.len(),
            "No worker left to render items, marking them failed"
        );
    }
    for item in leftover {
        let reason = if has_url(&item) {
            FailureReason::Failed
        } else {
            FailureReason::NoUrl
        };
        let record = EnrichedRecord::failed(item, reason);
        report.count(&record);
        records.push(record);
    }

    report.dropped = report.requested - report.emitted();
    if report.dropped > 0 {
        tracing::warn!(dropped = report.dropped, "Items lost to crashed workers");
    }

    tracing::info!(
        enriched = report.enriched,
        failed = report.failed,
        no_url = report.no_url,
        dropped = report.dropped,
        "Detail stage finished"
    );

    report
}

async fn run_worker<S: RenderSession>(
    worker_id: usize,
    mut session: S,
    queue: Queue,
    tx: mpsc::UnboundedSender<EnrichedRecord>,
    settings: DetailSettings,
) {
    tracing::debug!(worker_id, "Detail worker started");

    loop {
        let next = queue.lock().await.pop_front();
        let Some(item) = next else { break };

        let record = process_item(&mut session, item, &settings).await;
        if tx.send(record).is_err() {
            break;
        }
    }

    if let Err(e) = session.close().await {
        tracing::debug!(worker_id, error = %e, "Closing rendering session failed");
    }
    tracing::debug!(worker_id, "Detail worker finished");
}

async fn process_item<S: RenderSession>(
    session: &mut S,
    item: SearchResultItem,
    settings: &DetailSettings,
) -> EnrichedRecord {
    if !has_url(&item) {
        tracing::warn!(asin = %item.id, "Item has no URL");
        return EnrichedRecord::failed(item, FailureReason::NoUrl);
    }

    match render_detail(session, &item.url, settings).await {
        Ok(detail) => {
            tracing::debug!(asin = %item.id, "Product page extracted");
            EnrichedRecord::enriched(item, detail)
        }
        Err(e) => {
            tracing::warn!(asin = %item.id, error = %e, "Product page failed");
            EnrichedRecord::failed(item, FailureReason::Failed)
        }
    }
}

async fn render_detail<S: RenderSession>(
    session: &mut S,
    url: &str,
    settings: &DetailSettings,
) -> Result<ProductDetail, RenderError> {
    bounded(settings.render_timeout, url, session.navigate(url)).await?;
    settings.dwell.sleep().await;
    let html = bounded(settings.render_timeout, url, session.content()).await?;
    Ok(parse_product_page(&html))
}

async fn bounded<T, F>(limit: Option<Duration>, url: &str, step: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, step)
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                limit,
            })?,
        None => step.await,
    }
}

fn has_url(item: &SearchResultItem) -> bool {
    !item.url.trim().is_empty()
}

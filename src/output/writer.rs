//! Result writer with filename fallback
//!
//! The first attempt goes to the requested path. Every failed attempt moves
//! on to `base_1.ext`, `base_2.ext`, ... in the same directory. The format is
//! always taken from the requested path, so a fallback file never changes
//! encoding.

use crate::output::encode::encode_table;
use crate::output::{OutputFormat, WriteError};
use crate::record::{Table, Tabular};
use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};

/// Path used for the given zero-based attempt
///
/// # Examples
///
/// ```
/// use listing_harvester::output::candidate_path;
/// use std::path::{Path, PathBuf};
///
/// let path = Path::new("out/results.csv");
/// assert_eq!(candidate_path(path, 0), PathBuf::from("out/results.csv"));
/// assert_eq!(candidate_path(path, 2), PathBuf::from("out/results_2.csv"));
/// ```
pub fn candidate_path(path: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| OutputFormat::Csv.as_str().to_string());

    path.with_file_name(format!("{}_{}.{}", stem, attempt, extension))
}

/// Serializes record sets to disk
#[derive(Debug, Clone)]
pub struct ResultWriter {
    retry: RetryPolicy,
}

impl ResultWriter {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Writes `records` to `path` or a numbered sibling of it
    ///
    /// Every write error is treated as transient and moves to the next
    /// candidate name after the policy's pause.
    ///
    /// # Returns
    ///
    /// * `Some(path)` - The file actually written
    /// * `None` - Every attempt failed; the failures were logged
    pub async fn write<T: Tabular>(&self, records: &[T], path: &Path) -> Option<PathBuf> {
        let table = Table::from_records(records);
        let format = OutputFormat::from_path(path);

        let result = self
            .retry
            .run(
                |attempt| {
                    let target = candidate_path(path, attempt);
                    let table = &table;
                    async move {
                        match encode_table(table, format, &target) {
                            Ok(()) => Ok(target),
                            Err(e) => {
                                if e.is_locked() {
                                    tracing::warn!(
                                        path = %target.display(),
                                        "Output file is locked or not writable, trying another name"
                                    );
                                } else {
                                    tracing::warn!(
                                        path = %target.display(),
                                        error = %e,
                                        "Failed to write output file"
                                    );
                                }
                                Err(e)
                            }
                        }
                    }
                },
                |_: &WriteError| true,
            )
            .await;

        match result {
            Ok(written) => {
                tracing::info!(
                    records = records.len(),
                    format = %format,
                    path = %written.display(),
                    "Saved results"
                );
                Some(written)
            }
            Err(e) => {
                tracing::error!(
                    attempts = self.retry.max_attempts,
                    error = %e,
                    "Giving up on writing results"
                );
                None
            }
        }
    }
}

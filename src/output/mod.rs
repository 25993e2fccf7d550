//! Output module for persisting harvested records
//!
//! This module handles:
//! - Choosing the output format from the file extension
//! - Encoding the flattened record table as CSV, JSON or XLSX
//! - Retrying against incremented filenames when a write fails
//! - Summarizing the run for the operator

mod encode;
mod format;
mod stats;
mod writer;

pub use encode::encode_table;
pub use format::{OutputFormat, WriteError, WriteResult};
pub use stats::{print_summary, RunStatus, RunSummary};
pub use writer::{candidate_path, ResultWriter};

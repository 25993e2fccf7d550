//! Output formats and errors

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing a result file
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl WriteError {
    /// Returns true if the target is locked or not writable by us
    pub fn is_locked(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            Self::Csv(e) => matches!(
                e.kind(),
                csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::PermissionDenied
            ),
            _ => false,
        }
    }
}

/// Result type for output operations
pub type WriteResult<T> = Result<T, WriteError>;

/// Supported output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Json,
    Xlsx,
}

impl OutputFormat {
    /// Infers the format from the path's extension (case-insensitive)
    ///
    /// A missing or unrecognized extension means CSV.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Self::Json,
            Some("xlsx") => Self::Xlsx,
            _ => Self::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.XLSX")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("dir/out.Json")), OutputFormat::Json);
    }

    #[test]
    fn test_unknown_or_missing_extension_is_csv() {
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.txt")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.")), OutputFormat::Csv);
    }

    #[test]
    fn test_permission_denied_is_locked() {
        let locked = WriteError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(locked.is_locked());

        let missing = WriteError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!missing.is_locked());
    }
}

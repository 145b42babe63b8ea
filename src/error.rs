//! Unified error hierarchy for fitwrapped
//!
//! Hard failures are structural only: an unreadable file, an input that is not a
//! collection, an unsupported format. Everything at row granularity is recorded as a
//! [`RowError`] and the batch carries on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all fitwrapped operations
#[derive(Debug, Error)]
pub enum WrappedError {
    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),
}

/// Activity and wellness import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// Unsupported format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Input is not shaped like an activity batch at all
    #[error("Invalid data structure: {reason}")]
    InvalidStructure { reason: String },

    /// A spreadsheet export whose header matches neither vocabulary
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },
}

/// Analysis errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Year outside the range chrono can represent
    #[error("Invalid year: {year}")]
    InvalidYear { year: i32 },

    /// Insufficient data for an optional comparison
    #[error("Insufficient data for {calculation}: {reason}")]
    InsufficientData { calculation: String, reason: String },
}

/// Result type alias for fitwrapped operations
pub type Result<T> = std::result::Result<T, WrappedError>;

impl WrappedError {
    /// Whether the caller can still show partial results
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WrappedError::Analysis(AnalysisError::InsufficientData { .. })
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WrappedError::Analysis(AnalysisError::InsufficientData { .. }) => ErrorSeverity::Info,
            WrappedError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            WrappedError::Import(ImportError::UnsupportedFormat { .. }) => ErrorSeverity::Warning,
            WrappedError::Import(ImportError::InvalidStructure { .. }) => ErrorSeverity::Error,
            WrappedError::Configuration(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            WrappedError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find activity file: {}", path.display())
            }
            WrappedError::Import(ImportError::UnsupportedFormat { format }) => {
                format!(
                    "Files of type '{}' are not supported. Use a CSV export or an activity JSON dump.",
                    format
                )
            }
            WrappedError::Import(ImportError::InvalidStructure { reason }) => {
                format!("The input does not look like an activity list: {}", reason)
            }
            WrappedError::Import(ImportError::MissingColumn { column }) => {
                format!(
                    "The CSV export has no '{}' column. Export the activity list in English or German.",
                    column
                )
            }
            WrappedError::Analysis(AnalysisError::InsufficientData { calculation, .. }) => {
                format!("Not enough activities to calculate {}.", calculation)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

/// A single source row that could not be turned into an activity.
///
/// Row errors never abort a batch; they travel with the imported activities and end up
/// in the diagnostics of the computed year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based position of the row within its source (header excluded)
    pub row: usize,
    /// Source name, e.g. the file name
    pub source: String,
    /// Why the row was rejected
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            row,
            source: source.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} row {}: {}", self.source, self.row + 1, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = WrappedError::Import(ImportError::FileNotFound {
            path: PathBuf::from("/test/activities.csv"),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = WrappedError::Import(ImportError::InvalidStructure {
            reason: "expected array".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_error_recoverable() {
        let err = WrappedError::Analysis(AnalysisError::InsufficientData {
            calculation: "previous year".to_string(),
            reason: "3 activities".to_string(),
        });
        assert!(err.is_recoverable());

        let err = WrappedError::Configuration("bad".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = WrappedError::Import(ImportError::FileNotFound {
            path: PathBuf::from("activities.csv"),
        });
        assert!(err.user_message().contains("Could not find"));

        let err = WrappedError::Import(ImportError::MissingColumn {
            column: "Date".to_string(),
        });
        assert!(err.user_message().contains("'Date'"));
    }

    #[test]
    fn test_row_error_display_is_one_based() {
        let err = RowError::new(0, "export.csv", "unparseable date '32.13.2024'");
        assert_eq!(
            err.to_string(),
            "export.csv row 1: unparseable date '32.13.2024'"
        );
    }
}

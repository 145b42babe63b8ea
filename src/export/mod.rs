use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::year_stats::{YearComparison, YearStats};

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Text,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl ExportFormat {
    /// File extension written by this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

impl From<::csv::Error> for ExportError {
    fn from(err: ::csv::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

/// Write a year summary (and optional comparison) to `output_path` in `format`
pub fn export_year<P: AsRef<Path>>(
    stats: &YearStats,
    comparison: Option<&YearComparison>,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    match format {
        ExportFormat::Json => json::export_year_json(stats, comparison, path)?,
        ExportFormat::Text => text::export_text_report(stats, comparison, path)?,
        ExportFormat::Csv => csv::export_monthly_csv(stats, path)?,
    }

    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        "Year summary exported"
    );
    Ok(())
}

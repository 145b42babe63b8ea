// Library interface for fitwrapped modules
// This allows integration tests and benches to access the core functionality

pub mod aggregator;
pub mod badges;
pub mod buckets;
pub mod config;
pub mod error;
pub mod export;
pub mod hr_check;
pub mod import;
pub mod insights;
pub mod logging;
pub mod models;
pub mod power;
pub mod records;
pub mod running;
pub mod taxonomy;
pub mod training_effect;
pub mod wellness;
pub mod year_stats;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::{AnalysisSettings, AppConfig};
pub use error::{Result, RowError, WrappedError};
pub use import::{ActivityBatch, ImportManager};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use taxonomy::SportTaxonomy;
pub use year_stats::{YearComparison, YearStats, YearStatsCalculator};

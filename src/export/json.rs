use super::ExportError;
use crate::year_stats::{YearComparison, YearStats};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Year summary with its optional previous-year comparison, as written to disk
#[derive(Serialize)]
struct YearExport<'a> {
    stats: &'a YearStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<&'a YearComparison>,
}

/// Export a year summary to JSON
pub fn export_year_json<P: AsRef<Path>>(
    stats: &YearStats,
    comparison: Option<&YearComparison>,
    output_path: P,
) -> Result<(), ExportError> {
    export_json(&YearExport { stats, comparison }, output_path)
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

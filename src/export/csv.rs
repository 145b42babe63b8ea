use super::ExportError;
use crate::buckets::MONTH_NAMES;
use crate::year_stats::YearStats;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct MonthRow<'a> {
    month: &'a str,
    activities: u32,
    distance_km: String,
    duration_hours: String,
    calories: String,
}

/// Export the twelve monthly buckets to CSV (suitable for spreadsheet plotting)
pub fn export_monthly_csv<P: AsRef<Path>>(
    stats: &YearStats,
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(output_path)?;

    for month in &stats.monthly {
        writer.serialize(MonthRow {
            month: MONTH_NAMES[(month.month - 1) as usize],
            activities: month.activities,
            distance_km: format!("{:.2}", month.distance),
            duration_hours: format!("{:.2}", month.duration),
            calories: format!("{:.0}", month.calories),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, SportCategory};
    use crate::year_stats::YearStatsCalculator;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_monthly_csv() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut ride = Activity::new("b", SportCategory::Cycling, "Ride", start, 45_500.0, 5400.0);
        ride.calories = Some(1210.0);
        let stats = YearStatsCalculator::new().calculate(2025, &[ride], None);

        let temp_file = NamedTempFile::new().unwrap();
        export_monthly_csv(&stats, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "month,activities,distance_km,duration_hours,calories");
        assert_eq!(lines[1], "January,0,0.00,0.00,0");
        assert_eq!(lines[2], "February,1,45.50,1.50,1210");
    }
}

//! Heart-rate sanity check
//!
//! Lists the highest recorded maximum heart rates so sensor artifacts (optical sensors
//! locking onto cadence, strap dropouts) can be spotted before trusting the records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{mean, Activity, SportCategory};

/// Entries listed in the top list
pub const TOP_ENTRIES: usize = 10;

/// Maximum heart rate above which a reading is flagged, bpm
pub const SUSPICIOUS_HEART_RATE: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateEntry {
    pub name: String,
    pub category: SportCategory,
    /// Source label as exported
    pub type_key: String,
    pub date: NaiveDate,
    pub max_heart_rate: f64,
    pub avg_heart_rate: Option<f64>,
}

impl From<&Activity> for HeartRateEntry {
    fn from(activity: &Activity) -> Self {
        Self {
            name: activity.name.clone(),
            category: activity.category,
            type_key: activity.type_key(),
            date: activity.date(),
            max_heart_rate: activity.max_heart_rate.unwrap_or(0.0),
            avg_heart_rate: activity.avg_heart_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateReport {
    pub total_activities: usize,
    pub activities_with_hr: usize,
    /// Highest maximum heart rates, descending
    pub top_max_hr: Vec<HeartRateEntry>,
    /// Every reading above [`SUSPICIOUS_HEART_RATE`], descending
    pub suspicious: Vec<HeartRateEntry>,
    /// Rounded mean of the average heart rates of activities with a maximum
    pub overall_avg_training_hr: Option<f64>,
}

impl HeartRateReport {
    pub fn suspicious_count(&self) -> usize {
        self.suspicious.len()
    }
}

/// Build the heart-rate report for a batch of activities
pub fn check_heart_rates(activities: &[Activity]) -> HeartRateReport {
    let mut with_hr: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.max_heart_rate.map_or(false, |hr| hr > 0.0))
        .collect();

    // Stable sort keeps source order among equal readings
    with_hr.sort_by(|a, b| {
        let a = a.max_heart_rate.unwrap_or(0.0);
        let b = b.max_heart_rate.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });

    let overall_avg_training_hr = mean(
        with_hr
            .iter()
            .filter_map(|a| a.avg_heart_rate)
            .filter(|hr| *hr > 0.0),
    )
    .map(f64::round);

    let suspicious: Vec<HeartRateEntry> = with_hr
        .iter()
        .filter(|a| a.max_heart_rate.map_or(false, |hr| hr > SUSPICIOUS_HEART_RATE))
        .map(|a| HeartRateEntry::from(*a))
        .collect();

    if !suspicious.is_empty() {
        tracing::warn!(
            count = suspicious.len(),
            threshold = SUSPICIOUS_HEART_RATE,
            "Suspicious maximum heart rates found"
        );
    }

    HeartRateReport {
        total_activities: activities.len(),
        activities_with_hr: with_hr.len(),
        top_max_hr: with_hr
            .iter()
            .take(TOP_ENTRIES)
            .map(|a| HeartRateEntry::from(*a))
            .collect(),
        suspicious,
        overall_avg_training_hr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_hr(id: &str, max: Option<f64>, avg: Option<f64>) -> Activity {
        let start = NaiveDate::from_ymd_opt(2024, 2, 14)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let mut activity = Activity::new(id, SportCategory::Running, id, start, 6000.0, 1900.0);
        activity.max_heart_rate = max;
        activity.avg_heart_rate = avg;
        activity
    }

    #[test]
    fn test_empty_batch() {
        let report = check_heart_rates(&[]);
        assert_eq!(report.total_activities, 0);
        assert_eq!(report.activities_with_hr, 0);
        assert!(report.top_max_hr.is_empty());
        assert!(report.overall_avg_training_hr.is_none());
    }

    #[test]
    fn test_report_orders_and_flags() {
        let activities = vec![
            with_hr("steady", Some(168.0), Some(141.0)),
            with_hr("artifact", Some(236.0), Some(150.0)),
            with_hr("no strap", None, None),
            with_hr("intervals", Some(201.0), Some(156.0)),
            with_hr("zero", Some(0.0), Some(120.0)),
        ];
        let report = check_heart_rates(&activities);

        assert_eq!(report.total_activities, 5);
        assert_eq!(report.activities_with_hr, 3);
        let names: Vec<&str> = report.top_max_hr.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["artifact", "intervals", "steady"]);
        assert_eq!(report.suspicious_count(), 2);
        // (141 + 150 + 156) / 3 = 149
        assert_eq!(report.overall_avg_training_hr, Some(149.0));
    }

    #[test]
    fn test_top_list_is_capped() {
        let activities: Vec<Activity> = (0..15)
            .map(|i| with_hr(&format!("a{}", i), Some(150.0 + i as f64), None))
            .collect();
        let report = check_heart_rates(&activities);
        assert_eq!(report.top_max_hr.len(), TOP_ENTRIES);
        assert_eq!(report.top_max_hr[0].max_heart_rate, 164.0);
        assert!(report.suspicious.is_empty());
    }
}

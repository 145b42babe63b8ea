//! Cycling power analysis
//!
//! Year summary of power meter data: average and peak power, an FTP estimate from the best
//! 20 minute power, accumulated training stress and the FTP trend across the year.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::buckets::MONTH_NAMES;
use crate::config::AnalysisSettings;
use crate::models::{mean, round_to, Activity, PowerMetrics, SportCategory, Trend};

/// Rides with power needed before the block is considered meaningful
pub const MIN_POWER_ENTRIES: usize = 3;

/// FTP samples needed for a trend
const MIN_FTP_SAMPLES: usize = 4;

/// Samples averaged at each end of the year for the FTP trend
const FTP_TREND_WINDOW: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpTrendDetails {
    /// Watts
    pub start_ftp: f64,
    pub end_ftp: f64,
    pub change_percent: f64,
    /// Month abbreviation of the first sample
    pub start_period: String,
    /// Month abbreviation of the last sample
    pub end_period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclingPowerAnalytics {
    pub data_points: usize,
    pub avg_power: Option<f64>,
    pub max_power: Option<f64>,
    /// Highest 20 minute power of the year
    pub estimated_ftp: Option<f64>,
    pub total_tss: f64,
    /// Left leg share in percent
    pub avg_balance: Option<f64>,
    pub ftp_trend: Trend,
    pub ftp_trend_details: Option<FtpTrendDetails>,
    pub has_data: bool,
}

struct PowerEntry<'a> {
    start_time: NaiveDateTime,
    power: &'a PowerMetrics,
}

/// Analyse rides with an average power, `None` when there are none
pub fn analyze_cycling_power(
    activities: &[Activity],
    settings: &AnalysisSettings,
) -> Option<CyclingPowerAnalytics> {
    let mut entries: Vec<PowerEntry> = activities
        .iter()
        .filter(|a| a.category == SportCategory::Cycling)
        .filter(|a| a.power.avg_power.map_or(false, |p| p > 0.0))
        .map(|a| PowerEntry {
            start_time: a.start_time,
            power: &a.power,
        })
        .collect();

    if entries.is_empty() {
        return None;
    }
    entries.sort_by_key(|entry| entry.start_time);

    let positive = |value: Option<f64>| value.filter(|v| *v > 0.0);

    let avg_power = mean(entries.iter().filter_map(|e| positive(e.power.avg_power)));
    let max_power = entries
        .iter()
        .filter_map(|e| positive(e.power.max_power))
        .reduce(f64::max);
    let estimated_ftp = entries
        .iter()
        .filter_map(|e| positive(e.power.max_20min_power))
        .reduce(f64::max);
    let total_tss: f64 = entries
        .iter()
        .filter_map(|e| positive(e.power.training_stress_score))
        .sum();
    let avg_balance = mean(entries.iter().filter_map(|e| positive(e.power.left_balance)));

    let ftp_samples: Vec<(NaiveDateTime, f64)> = entries
        .iter()
        .filter_map(|e| positive(e.power.max_20min_power).map(|ftp| (e.start_time, ftp)))
        .collect();
    let ftp_trend_details = ftp_trend_details(&ftp_samples);
    let ftp_trend = ftp_trend_details
        .as_ref()
        .map(|details| {
            Trend::from_change(details.change_exact(), settings.form_trend_threshold_pct)
        })
        .unwrap_or(Trend::Stable);

    Some(CyclingPowerAnalytics {
        data_points: entries.len(),
        avg_power: avg_power.map(|v| round_to(v, 0)),
        max_power,
        estimated_ftp,
        total_tss: round_to(total_tss, 0),
        avg_balance: avg_balance.map(|v| round_to(v, 0)),
        ftp_trend,
        ftp_trend_details,
        has_data: entries.len() >= MIN_POWER_ENTRIES,
    })
}

impl FtpTrendDetails {
    /// Unrounded change between the rounded start and end FTP
    fn change_exact(&self) -> f64 {
        if self.start_ftp > 0.0 {
            (self.end_ftp - self.start_ftp) / self.start_ftp * 100.0
        } else {
            0.0
        }
    }
}

/// Compare the mean of the first two FTP samples against the last two
fn ftp_trend_details(chronological: &[(NaiveDateTime, f64)]) -> Option<FtpTrendDetails> {
    if chronological.len() < MIN_FTP_SAMPLES {
        return None;
    }

    let first = &chronological[..FTP_TREND_WINDOW];
    let last = &chronological[chronological.len() - FTP_TREND_WINDOW..];

    let start_ftp = round_to(mean(first.iter().map(|(_, ftp)| *ftp))?, 0);
    let end_ftp = round_to(mean(last.iter().map(|(_, ftp)| *ftp))?, 0);
    let start_time = first.first()?.0;
    let end_time = last.last()?.0;

    let mut details = FtpTrendDetails {
        start_ftp,
        end_ftp,
        change_percent: 0.0,
        start_period: month_abbreviation(start_time),
        end_period: month_abbreviation(end_time),
    };
    details.change_percent = round_to(details.change_exact(), 0);
    Some(details)
}

fn month_abbreviation(time: NaiveDateTime) -> String {
    MONTH_NAMES[time.month0() as usize].chars().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ride(month: u32, avg: Option<f64>, ftp: Option<f64>) -> Activity {
        let start = NaiveDate::from_ymd_opt(2024, month, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut ride = Activity::new("b", SportCategory::Cycling, "Ride", start, 50_000.0, 7200.0);
        ride.power.avg_power = avg;
        ride.power.max_20min_power = ftp;
        ride
    }

    #[test]
    fn test_rides_without_average_power_are_ignored() {
        let settings = AnalysisSettings::default();
        assert!(analyze_cycling_power(&[], &settings).is_none());
        assert!(analyze_cycling_power(&[ride(1, None, Some(250.0))], &settings).is_none());

        let mut run = ride(1, Some(200.0), None);
        run.category = SportCategory::Running;
        assert!(analyze_cycling_power(&[run], &settings).is_none());
    }

    #[test]
    fn test_power_summary() {
        let settings = AnalysisSettings::default();
        let mut first = ride(2, Some(180.0), Some(240.0));
        first.power.max_power = Some(820.0);
        first.power.training_stress_score = Some(95.4);
        first.power.left_balance = Some(49.0);
        let mut second = ride(3, Some(205.0), Some(255.0));
        second.power.max_power = Some(1010.0);
        second.power.training_stress_score = Some(120.3);
        second.power.left_balance = Some(52.0);

        let power = analyze_cycling_power(&[first, second], &settings).unwrap();
        assert_eq!(power.data_points, 2);
        assert!(!power.has_data);
        assert_eq!(power.avg_power, Some(193.0));
        assert_eq!(power.max_power, Some(1010.0));
        assert_eq!(power.estimated_ftp, Some(255.0));
        assert_eq!(power.total_tss, 216.0);
        assert_eq!(power.avg_balance, Some(51.0));
        assert!(power.ftp_trend_details.is_none());
        assert_eq!(power.ftp_trend, Trend::Stable);
    }

    #[test]
    fn test_ftp_trend_uses_chronological_ends() {
        let settings = AnalysisSettings::default();
        // Deliberately out of order
        let rides = vec![
            ride(11, Some(210.0), Some(270.0)),
            ride(1, Some(190.0), Some(240.0)),
            ride(6, Some(200.0), Some(300.0)),
            ride(2, Some(190.0), Some(250.0)),
            ride(12, Some(215.0), Some(280.0)),
        ];
        let power = analyze_cycling_power(&rides, &settings).unwrap();
        assert!(power.has_data);

        let details = power.ftp_trend_details.unwrap();
        assert_eq!(details.start_ftp, 245.0);
        assert_eq!(details.end_ftp, 275.0);
        assert_eq!(details.change_percent, 12.0);
        assert_eq!(details.start_period, "Jan");
        assert_eq!(details.end_period, "Dec");
        assert_eq!(power.ftp_trend, Trend::Improving);
    }

    #[test]
    fn test_flat_ftp_is_stable() {
        let settings = AnalysisSettings::default();
        let rides: Vec<Activity> = (1..=4).map(|m| ride(m, Some(200.0), Some(250.0))).collect();
        let power = analyze_cycling_power(&rides, &settings).unwrap();
        assert_eq!(power.ftp_trend, Trend::Stable);
        assert_eq!(power.ftp_trend_details.unwrap().change_percent, 0.0);
    }
}

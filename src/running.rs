//! Running form analysis
//!
//! Summarises the running dynamics recorded by chest straps and foot pods: ground contact
//! time, vertical oscillation, stride length, cadence, vertical ratio and ground contact
//! balance. Only running activities carrying at least one of these metrics contribute.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisSettings;
use crate::models::{mean, round_to, Activity, RunningDynamics, SportCategory, Trend};

/// Entries needed before the running form block is considered meaningful
pub const MIN_FORM_ENTRIES: usize = 5;

/// Year summary of running dynamics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningFormAnalytics {
    pub data_points: usize,
    /// Milliseconds
    pub avg_ground_contact_time: Option<f64>,
    /// Centimeters
    pub avg_vertical_oscillation: Option<f64>,
    /// Meters
    pub avg_stride_length: Option<f64>,
    /// Steps per minute
    pub avg_cadence: Option<f64>,
    /// Percent
    pub avg_vertical_ratio: Option<f64>,
    /// Left foot share in percent
    pub avg_balance: Option<f64>,
    pub best_ground_contact_time: Option<f64>,
    pub best_vertical_oscillation: Option<f64>,
    pub best_cadence: Option<f64>,
    /// 0 - 100
    pub efficiency_score: u32,
    /// Ground contact time trend, lower is better
    pub trend: Trend,
    pub has_data: bool,
}

struct FormEntry<'a> {
    start_time: NaiveDateTime,
    dynamics: &'a RunningDynamics,
}

/// Analyse the running dynamics of a year, `None` when no run carries any
pub fn analyze_running_form(
    activities: &[Activity],
    settings: &AnalysisSettings,
) -> Option<RunningFormAnalytics> {
    let mut entries: Vec<FormEntry> = activities
        .iter()
        .filter(|a| a.category == SportCategory::Running && !a.running_dynamics.is_empty())
        .map(|a| FormEntry {
            start_time: a.start_time,
            dynamics: &a.running_dynamics,
        })
        .collect();

    if entries.is_empty() {
        return None;
    }
    entries.sort_by_key(|entry| entry.start_time);

    let values = |metric: fn(&RunningDynamics) -> Option<f64>| -> Vec<f64> {
        entries
            .iter()
            .filter_map(|entry| metric(entry.dynamics))
            .filter(|v| *v > 0.0)
            .collect()
    };

    let gct = values(|d: &RunningDynamics| d.ground_contact_time);
    let vo = values(|d: &RunningDynamics| d.vertical_oscillation);
    let stride = values(|d: &RunningDynamics| d.stride_length);
    let cadence = values(|d: &RunningDynamics| d.cadence);
    let ratio = values(|d: &RunningDynamics| d.vertical_ratio);
    let balance = values(|d: &RunningDynamics| d.ground_contact_balance);

    let avg_gct = mean(gct.iter().copied());
    let avg_vo = mean(vo.iter().copied());
    let avg_cadence = mean(cadence.iter().copied());

    let trend = if gct.len() >= settings.min_trend_samples {
        gct_trend(&gct, settings.form_trend_threshold_pct)
    } else {
        Trend::Stable
    };

    Some(RunningFormAnalytics {
        data_points: entries.len(),
        avg_ground_contact_time: avg_gct.map(|v| round_to(v, 0)),
        avg_vertical_oscillation: avg_vo.map(|v| round_to(v, 1)),
        avg_stride_length: mean(stride.iter().copied()).map(|v| round_to(v, 2)),
        avg_cadence: avg_cadence.map(|v| round_to(v, 0)),
        avg_vertical_ratio: mean(ratio.iter().copied()).map(|v| round_to(v, 1)),
        avg_balance: mean(balance.iter().copied()).map(|v| round_to(v, 1)),
        best_ground_contact_time: gct.iter().copied().reduce(f64::min),
        best_vertical_oscillation: vo.iter().copied().reduce(f64::min).map(|v| round_to(v, 1)),
        best_cadence: cadence.iter().copied().reduce(f64::max),
        efficiency_score: efficiency_score(avg_gct, avg_vo, avg_cadence),
        trend,
        has_data: entries.len() >= MIN_FORM_ENTRIES,
    })
}

/// Score running economy from the year averages.
///
/// Starts at 50; each available metric adds up to 15 points. Clamped to 0 - 100.
pub fn efficiency_score(
    avg_ground_contact_time: Option<f64>,
    avg_vertical_oscillation: Option<f64>,
    avg_cadence: Option<f64>,
) -> u32 {
    let mut score = 50i32;

    if let Some(gct) = avg_ground_contact_time {
        score += match gct {
            g if g < 240.0 => 15,
            g if g < 260.0 => 10,
            g if g < 280.0 => 5,
            _ => 0,
        };
    }
    if let Some(vo) = avg_vertical_oscillation {
        score += match vo {
            v if v < 8.0 => 15,
            v if v < 9.0 => 10,
            v if v < 10.0 => 5,
            _ => 0,
        };
    }
    if let Some(cadence) = avg_cadence {
        score += match cadence {
            c if c >= 180.0 => 15,
            c if c >= 170.0 => 10,
            c if c >= 160.0 => 5,
            _ => 0,
        };
    }

    score.clamp(0, 100) as u32
}

/// Compare the chronological halves of the ground contact samples
fn gct_trend(chronological: &[f64], threshold_pct: f64) -> Trend {
    let (first, second) = chronological.split_at(chronological.len() / 2);
    match (mean(first.iter().copied()), mean(second.iter().copied())) {
        (Some(first), Some(second)) if first > 0.0 => {
            // Shorter contact is better, so a drop counts as improvement
            Trend::from_change((first - second) / first * 100.0, threshold_pct)
        }
        _ => Trend::Stable,
    }
}

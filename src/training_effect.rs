//! Training effect and training conditions
//!
//! Aerobic and anaerobic training effect scores (0.0 - 5.0) as reported by the device after
//! each session, and the temperatures the sessions were recorded in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{mean, round_to, Activity};

/// Entries needed before the training effect block is considered meaningful
pub const MIN_EFFECT_ENTRIES: usize = 5;

/// Average temperature below which a session counts as cold, in °C
pub const COLD_THRESHOLD_C: f64 = 5.0;

/// Average temperature above which a session counts as hot, in °C
pub const HOT_THRESHOLD_C: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEffectAnalytics {
    pub data_points: usize,
    pub avg_aerobic_effect: f64,
    pub avg_anaerobic_effect: f64,
    pub max_aerobic_effect: f64,
    pub max_anaerobic_effect: f64,
    /// Most frequent effect label, e.g. `TEMPO`
    pub dominant_label: Option<String>,
    pub has_data: bool,
}

/// Summarise training effect scores.
///
/// An activity contributes when it has either score; a missing score counts as 0.
pub fn analyze_training_effect(activities: &[Activity]) -> Option<TrainingEffectAnalytics> {
    let entries: Vec<(f64, f64, Option<&str>)> = activities
        .iter()
        .filter(|a| {
            let te = &a.training_effect;
            te.aerobic.map_or(false, |v| v > 0.0) || te.anaerobic.map_or(false, |v| v > 0.0)
        })
        .map(|a| {
            let te = &a.training_effect;
            (
                te.aerobic.unwrap_or(0.0),
                te.anaerobic.unwrap_or(0.0),
                te.label.as_deref(),
            )
        })
        .collect();

    if entries.is_empty() {
        return None;
    }

    let avg_aerobic = mean(entries.iter().map(|(aerobic, _, _)| *aerobic)).unwrap_or(0.0);
    let avg_anaerobic = mean(entries.iter().map(|(_, anaerobic, _)| *anaerobic)).unwrap_or(0.0);
    let max_aerobic = entries.iter().map(|(a, _, _)| *a).fold(0.0, f64::max);
    let max_anaerobic = entries.iter().map(|(_, a, _)| *a).fold(0.0, f64::max);

    Some(TrainingEffectAnalytics {
        data_points: entries.len(),
        avg_aerobic_effect: round_to(avg_aerobic, 1),
        avg_anaerobic_effect: round_to(avg_anaerobic, 1),
        max_aerobic_effect: max_aerobic,
        max_anaerobic_effect: max_anaerobic,
        dominant_label: dominant_label(entries.iter().filter_map(|(_, _, label)| *label)),
        has_data: entries.len() >= MIN_EFFECT_ENTRIES,
    })
}

/// Most frequent label; among equally frequent labels the one seen first wins
fn dominant_label<'a, I>(labels: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for label in labels {
        let count = counts.entry(label).or_insert(0);
        if *count == 0 {
            order.push(label);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for label in order {
        let count = counts[label];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    /// Activities with a minimum or maximum temperature
    pub data_points: usize,
    /// Mean of the per-activity average temperatures, °C
    pub avg_temperature: Option<f64>,
    pub coldest: Option<f64>,
    pub hottest: Option<f64>,
    pub cold_activities: usize,
    pub hot_activities: usize,
}

/// Summarise recorded temperatures, `None` when no activity has one
pub fn analyze_temperature(activities: &[Activity]) -> Option<TemperatureStats> {
    let recorded: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.min_temperature.is_some() || a.max_temperature.is_some())
        .collect();

    if recorded.is_empty() {
        return None;
    }

    let averages: Vec<f64> = recorded.iter().filter_map(|a| a.avg_temperature()).collect();

    Some(TemperatureStats {
        data_points: recorded.len(),
        avg_temperature: mean(averages.iter().copied()).map(|t| round_to(t, 1)),
        coldest: recorded
            .iter()
            .filter_map(|a| a.min_temperature.or(a.max_temperature))
            .reduce(f64::min),
        hottest: recorded
            .iter()
            .filter_map(|a| a.max_temperature.or(a.min_temperature))
            .reduce(f64::max),
        cold_activities: averages.iter().filter(|t| **t < COLD_THRESHOLD_C).count(),
        hot_activities: averages.iter().filter(|t| **t > HOT_THRESHOLD_C).count(),
    })
}

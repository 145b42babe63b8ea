//! Year-in-review computation
//!
//! [`YearStatsCalculator`] wires the individual engines together: the taxonomy diagnostics,
//! the sport aggregator, the records engine, the time buckets, the wellness correlator and
//! the insight and badge rules. The result is a plain serializable [`YearStats`] value.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

use crate::aggregator::{aggregate_by_sport, subtype_breakdown, SportStats, SubtypeStats};
use crate::badges::{evaluate_badges, Achievements, BadgeInputs};
use crate::buckets::{
    monthly_buckets, training_patterns, weekday_buckets, MonthlyStats, TrainingPatterns,
    WeekdayStats,
};
use crate::config::AnalysisSettings;
use crate::error::{AnalysisError, Result, RowError};
use crate::import::ActivityBatch;
use crate::insights::{find_epic_moment, generate_insights, EpicMoment, Insight, InsightContext};
use crate::models::{round_to, Activity, SportCategory, WellnessData};
use crate::power::{analyze_cycling_power, CyclingPowerAnalytics};
use crate::records::{compute_records, PersonalRecords};
use crate::running::{analyze_running_form, RunningFormAnalytics};
use crate::taxonomy::SportTaxonomy;
use crate::training_effect::{
    analyze_temperature, analyze_training_effect, TemperatureStats, TrainingEffectAnalytics,
};
use crate::wellness::{health_stats, wellness_insights, HealthStats, WellnessInsights};

/// Non-fatal findings collected while computing a year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Source labels that were folded into `other`
    pub unknown_activity_types: Vec<String>,
    /// Rows that could not be imported
    pub row_errors: Vec<RowError>,
    /// Multisport segments counted for records only
    pub multisport_segments: usize,
}

/// Complete year summary.
///
/// Distances are kilometers, durations hours, elevation meters. Optional blocks are `None`
/// when the year does not carry the data they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
    pub year: i32,
    pub total_activities: usize,
    pub total_distance: f64,
    pub total_duration: f64,
    pub total_elevation: f64,
    pub total_calories: f64,
    pub active_days: usize,
    pub by_sport: BTreeMap<SportCategory, SportStats>,
    pub cycling_breakdown: Option<BTreeMap<String, SubtypeStats>>,
    pub other_breakdown: Option<BTreeMap<String, SubtypeStats>>,
    pub records: PersonalRecords,
    pub monthly: [MonthlyStats; 12],
    pub weekdays: [WeekdayStats; 7],
    pub insights: Vec<Insight>,
    pub epic_moment: Option<EpicMoment>,
    pub health: Option<HealthStats>,
    pub training_patterns: Option<TrainingPatterns>,
    pub wellness: Option<WellnessInsights>,
    pub running_form: Option<RunningFormAnalytics>,
    pub cycling_power: Option<CyclingPowerAnalytics>,
    pub training_effect: Option<TrainingEffectAnalytics>,
    pub temperature: Option<TemperatureStats>,
    pub achievements: Option<Achievements>,
    pub diagnostics: Diagnostics,
}

/// One metric of the year over year comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub label: String,
    pub unit: String,
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    /// Rounded percent change, `None` when the previous year had nothing
    pub change_percent: Option<f64>,
}

impl MetricChange {
    fn new(label: &str, unit: &str, current: f64, previous: f64) -> Self {
        let change_percent =
            (previous != 0.0).then(|| ((current - previous) / previous * 100.0).round());
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
            current,
            previous,
            change: current - previous,
            change_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearComparison {
    pub year: i32,
    pub previous_year: i32,
    /// Activities, distance, duration, elevation
    pub metrics: Vec<MetricChange>,
    /// Label of the metric with the largest percent gain
    pub best_improvement: Option<String>,
    /// Mean of the non-negative percent changes
    pub average_improvement: f64,
    pub previous: YearStats,
}

/// Computes [`YearStats`] from activities and optional wellness data
#[derive(Debug, Clone, Default)]
pub struct YearStatsCalculator {
    settings: AnalysisSettings,
    taxonomy: SportTaxonomy,
}

impl YearStatsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AnalysisSettings) -> Self {
        Self {
            settings,
            taxonomy: SportTaxonomy::new(),
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Compute the summary of `activities` as-is, without filtering by year
    #[instrument(skip(self, activities, wellness), fields(activities = activities.len()))]
    pub fn calculate(
        &self,
        year: i32,
        activities: &[Activity],
        wellness: Option<&WellnessData>,
    ) -> YearStats {
        // Multisport segments feed the records, everything else sees the parent only
        let primary: Vec<Activity> = activities
            .iter()
            .filter(|a| !a.is_segment())
            .cloned()
            .collect();
        let segments = activities.len() - primary.len();

        let total_distance: f64 = primary.iter().map(Activity::distance_km).sum();
        let total_duration: f64 = primary.iter().map(Activity::duration_hours).sum();
        let total_elevation: f64 = primary.iter().filter_map(|a| a.elevation_gain).sum();
        let total_calories: f64 = primary.iter().filter_map(|a| a.calories).sum();
        let active_days = primary
            .iter()
            .map(Activity::date)
            .collect::<BTreeSet<NaiveDate>>()
            .len();

        let by_sport = aggregate_by_sport(&primary);
        let records = compute_records(
            activities,
            f64::from(self.settings.max_plausible_heart_rate),
        );
        let monthly = monthly_buckets(&primary);
        let weekdays = weekday_buckets(&primary);

        let insights = generate_insights(&InsightContext {
            activities: &primary,
            total_distance,
            total_duration,
            total_elevation,
            total_calories,
            monthly: &monthly,
            weekdays: &weekdays,
            longest_streak: records.longest_streak,
        });

        let samples = wellness.map(|w| w.samples.as_slice()).unwrap_or(&[]);
        let health = (!primary.is_empty() || !samples.is_empty())
            .then(|| health_stats(samples, &primary, &self.settings));
        let wellness_block =
            wellness.and_then(|data| wellness_insights(data, &primary, &self.settings));

        let running_form = analyze_running_form(&primary, &self.settings);
        let cycling_power = analyze_cycling_power(&primary, &self.settings);
        let temperature = analyze_temperature(&primary);

        let achievements = (!primary.is_empty()).then(|| {
            evaluate_badges(&BadgeInputs {
                activities: &primary,
                records: &records,
                total_distance,
                total_elevation,
                active_days,
                running_form: running_form.as_ref(),
                cycling_power: cycling_power.as_ref(),
                temperature: temperature.as_ref(),
            })
        });

        let diagnostics = Diagnostics {
            unknown_activity_types: self.taxonomy.unknown_labels(activities),
            row_errors: Vec::new(),
            multisport_segments: segments,
        };

        info!(
            year,
            activities = primary.len(),
            segments,
            distance_km = round_to(total_distance, 1),
            "Year statistics calculated"
        );

        YearStats {
            year,
            total_activities: primary.len(),
            total_distance: round_to(total_distance, 2),
            total_duration: round_to(total_duration, 2),
            total_elevation: round_to(total_elevation, 0),
            total_calories: round_to(total_calories, 0),
            active_days,
            cycling_breakdown: non_empty(subtype_breakdown(
                &primary,
                SportCategory::Cycling,
                &self.taxonomy,
            )),
            other_breakdown: non_empty(subtype_breakdown(
                &primary,
                SportCategory::Other,
                &self.taxonomy,
            )),
            epic_moment: find_epic_moment(&by_sport),
            by_sport,
            training_patterns: training_patterns(&primary, total_elevation, records.longest_streak),
            records,
            monthly,
            weekdays,
            insights,
            health,
            wellness: wellness_block,
            running_form,
            cycling_power,
            training_effect: analyze_training_effect(&primary),
            temperature,
            achievements,
            diagnostics,
        }
    }

    /// Compute the summary of one calendar year.
    ///
    /// Keeps activities and wellness samples dated from Jan 1 00:00 to Dec 31 23:59:59 of
    /// `year`, local time.
    pub fn calculate_for_year(
        &self,
        activities: &[Activity],
        year: i32,
        wellness: Option<&WellnessData>,
    ) -> Result<YearStats> {
        let in_year = filter_year(activities, year)?;
        let wellness_in_year = wellness.map(|data| WellnessData {
            samples: data
                .samples
                .iter()
                .filter(|s| s.date.year() == year)
                .cloned()
                .collect(),
            profile: data.profile.clone(),
        });

        debug!(
            year,
            kept = in_year.len(),
            total = activities.len(),
            "Filtered activities to year"
        );
        Ok(self.calculate(year, &in_year, wellness_in_year.as_ref()))
    }

    /// Like [`calculate_for_year`](Self::calculate_for_year), carrying the import
    /// diagnostics of `batch` into the result
    pub fn calculate_batch(
        &self,
        batch: &ActivityBatch,
        year: i32,
        wellness: Option<&WellnessData>,
    ) -> Result<YearStats> {
        let mut stats = self.calculate_for_year(&batch.activities, year, wellness)?;
        stats.diagnostics.row_errors = batch.errors.clone();

        // The importer may have classified with a different taxonomy
        let unknown: BTreeSet<String> = stats
            .diagnostics
            .unknown_activity_types
            .drain(..)
            .chain(batch.unknown_labels.iter().cloned())
            .collect();
        stats.diagnostics.unknown_activity_types = unknown.into_iter().collect();
        Ok(stats)
    }

    /// Compare `current` with the year before it.
    ///
    /// Fails with [`AnalysisError::InsufficientData`] when the previous year has fewer than
    /// `previous_year_min_activities` activities.
    pub fn compare_with_previous(
        &self,
        current: &YearStats,
        activities: &[Activity],
    ) -> Result<YearComparison> {
        let previous_year = current.year - 1;
        let previous_activities = filter_year(activities, previous_year)?;
        let primary_count = previous_activities.iter().filter(|a| !a.is_segment()).count();

        if primary_count < self.settings.previous_year_min_activities {
            return Err(AnalysisError::InsufficientData {
                calculation: format!("the {} comparison", previous_year),
                reason: format!(
                    "{} activities, at least {} needed",
                    primary_count, self.settings.previous_year_min_activities
                ),
            }
            .into());
        }

        let previous = self.calculate(previous_year, &previous_activities, None);
        Ok(compare(current, previous))
    }
}

fn filter_year(activities: &[Activity], year: i32) -> Result<Vec<Activity>> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        return Err(AnalysisError::InvalidYear { year }.into());
    }
    Ok(activities
        .iter()
        .filter(|a| a.start_time.year() == year)
        .cloned()
        .collect())
}

fn non_empty<K, V>(map: BTreeMap<K, V>) -> Option<BTreeMap<K, V>> {
    (!map.is_empty()).then_some(map)
}

fn compare(current: &YearStats, previous: YearStats) -> YearComparison {
    let metrics = vec![
        MetricChange::new(
            "Activities",
            "",
            current.total_activities as f64,
            previous.total_activities as f64,
        ),
        MetricChange::new("Distance", "km", current.total_distance, previous.total_distance),
        MetricChange::new("Time", "h", current.total_duration, previous.total_duration),
        MetricChange::new("Elevation", "m", current.total_elevation, previous.total_elevation),
    ];

    let mut best: Option<&MetricChange> = None;
    for metric in &metrics {
        let Some(pct) = metric.change_percent else {
            continue;
        };
        if best
            .and_then(|b| b.change_percent)
            .map_or(true, |best_pct| pct > best_pct)
        {
            best = Some(metric);
        }
    }

    let average_improvement = round_to(
        metrics
            .iter()
            .map(|m| m.change_percent.unwrap_or(0.0).max(0.0))
            .sum::<f64>()
            / metrics.len() as f64,
        0,
    );

    YearComparison {
        year: current.year,
        previous_year: previous.year,
        best_improvement: best
            .filter(|m| m.change_percent.map_or(false, |p| p > 0.0))
            .map(|m| m.label.clone()),
        average_improvement,
        metrics,
        previous,
    }
}

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::buckets::{MONTH_NAMES, WEEKDAY_NAMES};
use crate::config::AnalysisSettings;
use crate::models::{mean, round_to, Activity, Trend, WellnessData, WellnessSample};

/// Day keys of the weekly step pattern, Sunday first
pub const WEEKDAY_KEYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

const MIN_STEP_DAYS: usize = 10;
const MIN_SLEEP_DAYS: usize = 5;
const MIN_HRV_DAYS: usize = 5;
const MIN_BODY_BATTERY_DAYS: usize = 3;
const MIN_SWEAT_SAMPLES: usize = 5;

const PERFECT_SLEEP_SCORE: u8 = 100;
const EXCELLENT_SLEEP_SCORE: u8 = 85;

/// Heart and recovery summary combining wellness samples with activity heart rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStats {
    pub avg_resting_heart_rate: Option<f64>,
    /// Hours
    pub avg_sleep_duration: Option<f64>,
    /// Estimated for the whole year from the daily average
    pub total_steps: Option<f64>,
    pub avg_daily_steps: Option<f64>,
    /// Estimated heartbeats during all activities
    pub total_heartbeats: f64,
    /// Whether any figure comes from measured wellness data rather than estimates
    pub has_real_data: bool,
    pub avg_training_hr: Option<f64>,
    pub max_training_hr: Option<f64>,
    pub activities_with_hr: usize,
}

/// Compute [`HealthStats`]
pub fn health_stats(
    samples: &[WellnessSample],
    activities: &[Activity],
    settings: &AnalysisSettings,
) -> HealthStats {
    let resting: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.resting_heart_rate)
        .filter(|hr| *hr > 0.0)
        .collect();
    let sleep_hours: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.sleep_seconds)
        .filter(|secs| *secs > 0.0)
        .map(|secs| secs / 3600.0)
        .collect();
    let steps: Vec<f64> = step_samples(samples).map(|(_, steps)| f64::from(steps)).collect();

    let avg_daily_steps = mean(steps.iter().copied()).map(|v| round_to(v, 0));

    let ceiling = f64::from(settings.max_plausible_heart_rate);
    let plausible = |hr: &f64| *hr > 0.0 && *hr <= ceiling;
    let avg_hrs: Vec<f64> = activities
        .iter()
        .filter_map(|a| a.avg_heart_rate)
        .filter(plausible)
        .collect();
    let max_training_hr = activities
        .iter()
        .filter_map(|a| a.max_heart_rate)
        .filter(plausible)
        .reduce(f64::max);

    let avg_training_hr = mean(avg_hrs.iter().copied()).map(|v| round_to(v, 0));
    let heartbeat_rate =
        avg_training_hr.unwrap_or_else(|| f64::from(settings.fallback_activity_heart_rate));
    let total_hours: f64 = activities.iter().map(Activity::duration_hours).sum();

    HealthStats {
        avg_resting_heart_rate: mean(resting.iter().copied()).map(|v| round_to(v, 0)),
        avg_sleep_duration: mean(sleep_hours.iter().copied()).map(|v| round_to(v, 1)),
        total_steps: avg_daily_steps.map(|avg| avg * 365.0),
        avg_daily_steps,
        total_heartbeats: round_to(total_hours * 60.0 * heartbeat_rate, 0),
        has_real_data: !resting.is_empty() || !sleep_hours.is_empty() || !steps.is_empty(),
        avg_training_hr,
        max_training_hr,
        activities_with_hr: avg_hrs.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySteps {
    /// Weekday name
    pub day: String,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStepPattern {
    pub best: DaySteps,
    pub worst: DaySteps,
    /// Average steps keyed `sun` .. `sat`
    pub by_day: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestStepsDay {
    pub date: Option<NaiveDate>,
    pub steps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMonth {
    /// Month abbreviation
    pub name: String,
    pub steps: u32,
}

/// Steps, sleep, HRV, body battery and hydration summary of a year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WellnessInsights {
    pub avg_daily_steps: u32,
    pub estimated_yearly_steps: u64,
    pub best_steps_day: BestStepsDay,
    pub weekly_pattern: WeeklyStepPattern,
    /// Average steps per sampled day, index = month - 1
    pub monthly_steps: [u32; 12],
    pub best_month: BestMonth,

    pub avg_daily_sweat_loss_ml: Option<f64>,
    pub estimated_yearly_sweat_loss_ml: Option<f64>,
    pub sweat_loss_data_points: usize,

    pub avg_sleep_score: Option<f64>,
    pub perfect_sleep_days: usize,
    pub excellent_sleep_days: usize,
    pub sleep_score_count: usize,

    pub avg_hrv: Option<f64>,
    /// `None` with fewer samples than needed for a trend
    pub hrv_trend: Option<Trend>,
    /// Average HRV on days after an active day
    pub hrv_after_activity: Option<f64>,
    /// Average HRV on days after a rest day
    pub hrv_after_rest: Option<f64>,
    pub hrv_data_points: usize,

    pub avg_body_battery_change: Option<f64>,
    pub avg_activity_stress: Option<f64>,
    pub body_battery_data_points: usize,

    pub vo2max_running: Option<f64>,
    pub vo2max_cycling: Option<f64>,
    /// Kilograms
    pub user_weight: Option<f64>,

    pub has_steps_data: bool,
    pub has_sleep_data: bool,
    pub has_hrv_data: bool,
    pub has_body_battery_data: bool,
    pub has_sweat_loss_data: bool,
}

fn step_samples(samples: &[WellnessSample]) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
    samples
        .iter()
        .filter_map(|s| s.steps.filter(|steps| *steps > 0).map(|steps| (s.date, steps)))
}

/// Correlate wellness samples with the activities of the same year.
///
/// Returns `None` when the wellness source delivered nothing.
pub fn wellness_insights(
    data: &WellnessData,
    activities: &[Activity],
    settings: &AnalysisSettings,
) -> Option<WellnessInsights> {
    if data.is_empty() {
        return None;
    }
    let samples = &data.samples;

    // Steps
    let daily_steps: Vec<(NaiveDate, u32)> = step_samples(samples).collect();
    let avg_daily_steps = mean(daily_steps.iter().map(|(_, s)| f64::from(*s)))
        .map(|v| round_to(v, 0) as u32)
        .unwrap_or(0);

    let mut best_steps_day = BestStepsDay {
        date: None,
        steps: 0,
    };
    let mut weekday_totals = [(0u64, 0u32); 7];
    let mut month_totals = [(0u64, 0u32); 12];
    for (date, steps) in &daily_steps {
        if *steps > best_steps_day.steps {
            best_steps_day = BestStepsDay {
                date: Some(*date),
                steps: *steps,
            };
        }
        let weekday = &mut weekday_totals[date.weekday().num_days_from_sunday() as usize];
        weekday.0 += u64::from(*steps);
        weekday.1 += 1;
        let month = &mut month_totals[date.month0() as usize];
        month.0 += u64::from(*steps);
        month.1 += 1;
    }

    let weekday_avgs: [u32; 7] = weekday_totals.map(average_steps);
    let monthly_steps: [u32; 12] = month_totals.map(average_steps);

    // Sleep
    let sleep_scores: Vec<u8> = samples
        .iter()
        .filter_map(|s| s.sleep_score)
        .filter(|score| *score > 0)
        .collect();

    // HRV
    let mut hrv: Vec<(NaiveDate, f64)> = samples
        .iter()
        .filter_map(|s| s.hrv.filter(|v| *v > 0.0).map(|v| (s.date, v)))
        .collect();
    hrv.sort_by_key(|(date, _)| *date);

    let active_dates: HashSet<NaiveDate> = activities.iter().map(Activity::date).collect();
    let (after_activity, after_rest): (Vec<_>, Vec<_>) = hrv
        .iter()
        .partition(|(date, _)| active_dates.contains(&(*date - Duration::days(1))));

    let hrv_trend = (hrv.len() >= settings.min_trend_samples)
        .then(|| hrv_trend(&hrv, settings.hrv_trend_threshold_pct));

    // Body battery and stress
    let body_battery: Vec<f64> = samples.iter().filter_map(|s| s.body_battery_change).collect();
    let avg_activity_stress = mean(
        activities
            .iter()
            .filter_map(|a| a.avg_stress)
            .filter(|stress| *stress > 0.0),
    )
    .map(|v| round_to(v, 0));

    // Hydration
    let sweat_samples: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.sweat_loss_ml)
        .filter(|ml| *ml > 0.0)
        .collect();
    let activity_sweat: Vec<f64> = activities
        .iter()
        .filter_map(|a| a.sweat_loss_ml)
        .filter(|ml| *ml > 0.0)
        .collect();
    let avg_daily_sweat_loss_ml = mean(sweat_samples.iter().copied()).map(|v| round_to(v, 0));
    let activity_sweat_total: f64 = activity_sweat.iter().sum();
    let estimated_yearly_sweat_loss_ml = match avg_daily_sweat_loss_ml {
        Some(avg) => Some(avg * 365.0),
        None if activity_sweat_total > 0.0 => Some(activity_sweat_total),
        None => None,
    };
    let sweat_loss_data_points = if sweat_samples.is_empty() {
        activity_sweat.len()
    } else {
        sweat_samples.len()
    };

    let profile = data.profile.clone().unwrap_or_default();

    Some(WellnessInsights {
        avg_daily_steps,
        estimated_yearly_steps: u64::from(avg_daily_steps) * 365,
        best_steps_day,
        weekly_pattern: weekly_pattern(&weekday_avgs),
        monthly_steps,
        best_month: best_month(&monthly_steps),

        avg_daily_sweat_loss_ml,
        estimated_yearly_sweat_loss_ml,
        sweat_loss_data_points,

        avg_sleep_score: mean(sleep_scores.iter().map(|s| f64::from(*s))).map(|v| round_to(v, 0)),
        perfect_sleep_days: sleep_scores
            .iter()
            .filter(|s| **s == PERFECT_SLEEP_SCORE)
            .count(),
        excellent_sleep_days: sleep_scores
            .iter()
            .filter(|s| **s >= EXCELLENT_SLEEP_SCORE)
            .count(),
        sleep_score_count: sleep_scores.len(),

        avg_hrv: mean(hrv.iter().map(|(_, v)| *v)).map(|v| round_to(v, 0)),
        hrv_trend,
        hrv_after_activity: mean(after_activity.iter().map(|(_, v)| *v)).map(|v| round_to(v, 0)),
        hrv_after_rest: mean(after_rest.iter().map(|(_, v)| *v)).map(|v| round_to(v, 0)),
        hrv_data_points: hrv.len(),

        avg_body_battery_change: mean(body_battery.iter().copied()).map(|v| round_to(v, 0)),
        avg_activity_stress,
        body_battery_data_points: body_battery.len(),

        vo2max_running: profile.vo2max_running.filter(|v| *v > 0.0),
        vo2max_cycling: profile.vo2max_cycling.filter(|v| *v > 0.0),
        user_weight: profile.weight_kg.filter(|v| *v > 0.0),

        has_steps_data: daily_steps.len() >= MIN_STEP_DAYS,
        has_sleep_data: sleep_scores.len() >= MIN_SLEEP_DAYS,
        has_hrv_data: hrv.len() >= MIN_HRV_DAYS,
        has_body_battery_data: body_battery.len() >= MIN_BODY_BATTERY_DAYS,
        has_sweat_loss_data: sweat_samples.len() >= MIN_SWEAT_SAMPLES
            || activity_sweat.len() >= MIN_SWEAT_SAMPLES,
    })
}

fn average_steps((total, days): (u64, u32)) -> u32 {
    if days == 0 {
        0
    } else {
        round_to(total as f64 / f64::from(days), 0) as u32
    }
}

/// Best weekday is the first maximum; worst is the first minimum among days with steps
fn weekly_pattern(averages: &[u32; 7]) -> WeeklyStepPattern {
    let mut best = (1usize, 0u32);
    let mut worst: Option<(usize, u32)> = None;

    for (index, steps) in averages.iter().enumerate() {
        if *steps > best.1 {
            best = (index, *steps);
        }
        if *steps > 0 && worst.map_or(true, |(_, w)| *steps < w) {
            worst = Some((index, *steps));
        }
    }
    let worst = worst.unwrap_or((1, 0));

    WeeklyStepPattern {
        best: DaySteps {
            day: WEEKDAY_NAMES[best.0].to_string(),
            steps: best.1,
        },
        worst: DaySteps {
            day: WEEKDAY_NAMES[worst.0].to_string(),
            steps: worst.1,
        },
        by_day: WEEKDAY_KEYS
            .iter()
            .zip(averages.iter())
            .map(|(key, steps)| (key.to_string(), *steps))
            .collect(),
    }
}

fn best_month(monthly: &[u32; 12]) -> BestMonth {
    let mut best = (0usize, 0u32);
    for (index, steps) in monthly.iter().enumerate() {
        if *steps > best.1 {
            best = (index, *steps);
        }
    }
    BestMonth {
        name: MONTH_NAMES[best.0].chars().take(3).collect(),
        steps: best.1,
    }
}

/// Second half of the year against the first; higher HRV is better
fn hrv_trend(chronological: &[(NaiveDate, f64)], threshold_pct: f64) -> Trend {
    let (first, second) = chronological.split_at(chronological.len() / 2);
    match (
        mean(first.iter().map(|(_, v)| *v)),
        mean(second.iter().map(|(_, v)| *v)),
    ) {
        (Some(first), Some(second)) if first > 0.0 => {
            Trend::from_change((second - first) / first * 100.0, threshold_pct)
        }
        _ => Trend::Stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SportCategory, UserProfile};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn steps_on(month: u32, day: u32, steps: u32) -> WellnessSample {
        let mut sample = WellnessSample::new(date(month, day));
        sample.steps = Some(steps);
        sample
    }

    fn activity_on(month: u32, day: u32, hours: f64) -> Activity {
        let start = date(month, day).and_hms_opt(7, 0, 0).unwrap();
        Activity::new("a", SportCategory::Running, "Run", start, 10_000.0, hours * 3600.0)
    }

    #[test]
    fn test_health_stats_heartbeats() {
        let settings = AnalysisSettings::default();
        let mut with_hr = activity_on(1, 1, 1.0);
        with_hr.avg_heart_rate = Some(150.0);
        with_hr.max_heart_rate = Some(185.0);
        let mut artifact = activity_on(1, 2, 1.0);
        artifact.avg_heart_rate = Some(240.0);
        artifact.max_heart_rate = Some(250.0);

        let stats = health_stats(&[], &[with_hr, artifact], &settings);
        assert_eq!(stats.avg_training_hr, Some(150.0));
        assert_eq!(stats.max_training_hr, Some(185.0));
        assert_eq!(stats.activities_with_hr, 1);
        assert_eq!(stats.total_heartbeats, 2.0 * 60.0 * 150.0);
        assert!(!stats.has_real_data);
        assert!(stats.avg_daily_steps.is_none());
    }

    #[test]
    fn test_health_stats_fallback_heart_rate() {
        let settings = AnalysisSettings::default();
        let stats = health_stats(&[], &[activity_on(1, 1, 0.5)], &settings);
        assert_eq!(stats.total_heartbeats, 0.5 * 60.0 * 140.0);
        assert!(stats.avg_training_hr.is_none());
    }

    #[test]
    fn test_health_stats_from_samples() {
        let settings = AnalysisSettings::default();
        let mut night = steps_on(2, 1, 9000);
        night.resting_heart_rate = Some(51.0);
        night.sleep_seconds = Some(7.5 * 3600.0);
        let mut other = steps_on(2, 2, 11000);
        other.resting_heart_rate = Some(54.0);

        let stats = health_stats(&[night, other], &[], &settings);
        assert_eq!(stats.avg_resting_heart_rate, Some(53.0));
        assert_eq!(stats.avg_sleep_duration, Some(7.5));
        assert_eq!(stats.avg_daily_steps, Some(10_000.0));
        assert_eq!(stats.total_steps, Some(3_650_000.0));
        assert!(stats.has_real_data);
        assert_eq!(stats.total_heartbeats, 0.0);
    }

    #[test]
    fn test_step_patterns() {
        let settings = AnalysisSettings::default();
        // 2024-06-02 Sunday, 06-03 Monday, 06-04 Tuesday
        let data = WellnessData {
            samples: vec![
                steps_on(6, 2, 4000),
                steps_on(6, 9, 6000),
                steps_on(6, 3, 12000),
                steps_on(6, 4, 8000),
                steps_on(7, 4, 0),
            ],
            profile: None,
        };
        let insights = wellness_insights(&data, &[], &settings).unwrap();

        assert_eq!(insights.avg_daily_steps, 7500);
        assert_eq!(insights.estimated_yearly_steps, 7500 * 365);
        assert_eq!(insights.best_steps_day.steps, 12000);
        assert_eq!(insights.best_steps_day.date, Some(date(6, 3)));
        assert_eq!(insights.weekly_pattern.by_day["sun"], 5000);
        assert_eq!(insights.weekly_pattern.best.day, "Monday");
        assert_eq!(insights.weekly_pattern.worst.day, "Sunday");
        assert_eq!(insights.weekly_pattern.worst.steps, 5000);
        assert_eq!(insights.monthly_steps[5], 7500);
        assert_eq!(insights.monthly_steps[6], 0);
        assert_eq!(insights.best_month.name, "Jun");
        assert!(!insights.has_steps_data);
    }

    #[test]
    fn test_sleep_counts() {
        let settings = AnalysisSettings::default();
        let samples = [100u8, 90, 85, 70, 100]
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let mut sample = WellnessSample::new(date(3, i as u32 + 1));
                sample.sleep_score = Some(*score);
                sample
            })
            .collect();
        let data = WellnessData {
            samples,
            profile: None,
        };
        let insights = wellness_insights(&data, &[], &settings).unwrap();
        assert_eq!(insights.perfect_sleep_days, 2);
        assert_eq!(insights.excellent_sleep_days, 4);
        assert_eq!(insights.avg_sleep_score, Some(89.0));
        assert!(insights.has_sleep_data);
    }

    #[test]
    fn test_hrv_trend_and_recovery_split() {
        let settings = AnalysisSettings::default();
        let samples: Vec<WellnessSample> = (1..=10)
            .map(|day| {
                let mut sample = WellnessSample::new(date(4, day));
                sample.hrv = Some(if day <= 5 { 40.0 } else { 50.0 });
                sample
            })
            .collect();
        let data = WellnessData {
            samples,
            profile: None,
        };
        // Active on April 5th, so April 6th is a day after activity
        let activities = vec![activity_on(4, 5, 1.0)];
        let insights = wellness_insights(&data, &activities, &settings).unwrap();

        assert_eq!(insights.hrv_trend, Some(Trend::Improving));
        assert_eq!(insights.avg_hrv, Some(45.0));
        assert_eq!(insights.hrv_after_activity, Some(50.0));
        // 5 x 40 + 4 x 50 over 9 days
        assert_eq!(insights.hrv_after_rest, Some(44.0));
        assert!(insights.has_hrv_data);
    }

    #[test]
    fn test_short_hrv_history_has_no_trend() {
        let settings = AnalysisSettings::default();
        let mut sample = WellnessSample::new(date(1, 1));
        sample.hrv = Some(60.0);
        let data = WellnessData {
            samples: vec![sample],
            profile: None,
        };
        let insights = wellness_insights(&data, &[], &settings).unwrap();
        assert!(insights.hrv_trend.is_none());
        assert!(insights.hrv_after_activity.is_none());
        assert_eq!(insights.hrv_after_rest, Some(60.0));
    }

    fn hrv_days(count: u32, first_half: f64, second_half: f64) -> WellnessData {
        let samples = (1..=count)
            .map(|day| {
                let mut sample = WellnessSample::new(date(8, day));
                sample.hrv = Some(if day <= count / 2 { first_half } else { second_half });
                sample
            })
            .collect();
        WellnessData {
            samples,
            profile: None,
        }
    }

    fn trend_of(data: &WellnessData) -> Option<Trend> {
        wellness_insights(data, &[], &AnalysisSettings::default())
            .unwrap()
            .hrv_trend
    }

    #[test]
    fn test_hrv_trend_thresholds() {
        assert_eq!(trend_of(&hrv_days(10, 50.0, 40.0)), Some(Trend::Declining));
        assert_eq!(trend_of(&hrv_days(10, 100.0, 104.9)), Some(Trend::Stable));
        assert_eq!(trend_of(&hrv_days(10, 100.0, 95.1)), Some(Trend::Stable));
        assert_eq!(trend_of(&hrv_days(10, 100.0, 105.1)), Some(Trend::Improving));
        assert_eq!(trend_of(&hrv_days(10, 100.0, 94.9)), Some(Trend::Declining));
    }

    #[test]
    fn test_hrv_trend_needs_ten_samples() {
        assert!(trend_of(&hrv_days(9, 40.0, 60.0)).is_none());
        assert_eq!(trend_of(&hrv_days(10, 40.0, 60.0)), Some(Trend::Improving));
    }

    #[test]
    fn test_has_data_flag_cutoffs() {
        let settings = AnalysisSettings::default();
        let insights_for = |samples: Vec<WellnessSample>| {
            let data = WellnessData {
                samples,
                profile: None,
            };
            wellness_insights(&data, &[], &settings).unwrap()
        };

        let steps = |days: u32| (1..=days).map(|day| steps_on(9, day, 5000)).collect::<Vec<_>>();
        assert!(!insights_for(steps(9)).has_steps_data);
        assert!(insights_for(steps(10)).has_steps_data);

        let battery = |days: u32| {
            (1..=days)
                .map(|day| {
                    let mut sample = WellnessSample::new(date(10, day));
                    sample.body_battery_change = Some(-12.0);
                    sample
                })
                .collect::<Vec<_>>()
        };
        assert!(!insights_for(battery(2)).has_body_battery_data);
        assert!(insights_for(battery(3)).has_body_battery_data);

        let sleep = |days: u32| {
            (1..=days)
                .map(|day| {
                    let mut sample = WellnessSample::new(date(11, day));
                    sample.sleep_score = Some(80);
                    sample
                })
                .collect::<Vec<_>>()
        };
        assert!(!insights_for(sleep(4)).has_sleep_data);
        assert!(insights_for(sleep(5)).has_sleep_data);

        assert!(!insights_for(hrv_days(4, 50.0, 50.0).samples).has_hrv_data);
        assert!(insights_for(hrv_days(5, 50.0, 50.0).samples).has_hrv_data);
    }

    #[test]
    fn test_sweat_loss_falls_back_to_activities() {
        let settings = AnalysisSettings::default();
        let activities: Vec<Activity> = (1..=5)
            .map(|day| {
                let mut activity = activity_on(5, day, 1.0);
                activity.sweat_loss_ml = Some(600.0);
                activity
            })
            .collect();
        let data = WellnessData {
            samples: Vec::new(),
            profile: Some(UserProfile {
                weight_kg: Some(70.0),
                vo2max_running: Some(55.0),
                vo2max_cycling: None,
            }),
        };
        let insights = wellness_insights(&data, &activities, &settings).unwrap();
        assert!(insights.avg_daily_sweat_loss_ml.is_none());
        assert_eq!(insights.estimated_yearly_sweat_loss_ml, Some(3000.0));
        assert_eq!(insights.sweat_loss_data_points, 5);
        assert!(insights.has_sweat_loss_data);
        assert_eq!(insights.vo2max_running, Some(55.0));
        assert_eq!(insights.user_weight, Some(70.0));
    }

    #[test]
    fn test_empty_wellness() {
        let settings = AnalysisSettings::default();
        assert!(wellness_insights(&WellnessData::default(), &[], &settings).is_none());
    }
}

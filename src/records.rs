use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{Activity, ActivityRef, SportCategory};

/// Inclusive distance tolerance band for a race distance, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceBand {
    pub name: &'static str,
    pub min_meters: f64,
    pub max_meters: f64,
}

impl RaceBand {
    pub const FIVE_K: RaceBand = RaceBand {
        name: "5K",
        min_meters: 4900.0,
        max_meters: 5500.0,
    };
    pub const TEN_K: RaceBand = RaceBand {
        name: "10K",
        min_meters: 9800.0,
        max_meters: 10500.0,
    };
    pub const HALF_MARATHON: RaceBand = RaceBand {
        name: "Half Marathon",
        min_meters: 21000.0,
        max_meters: 22000.0,
    };
    pub const MARATHON: RaceBand = RaceBand {
        name: "Marathon",
        min_meters: 42000.0,
        max_meters: 43000.0,
    };

    pub fn contains(&self, meters: f64) -> bool {
        meters >= self.min_meters && meters <= self.max_meters
    }
}

/// Best effort inside a race band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceRecord {
    /// Finishing time in seconds
    pub time: f64,
    pub date: NaiveDate,
    pub activity: ActivityRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateRecord {
    pub value: f64,
    pub activity: ActivityRef,
}

/// Year bests. Every record is optional; only the streak always has a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecords {
    pub fastest_5k: Option<RaceRecord>,
    pub fastest_10k: Option<RaceRecord>,
    pub fastest_half_marathon: Option<RaceRecord>,
    pub fastest_marathon: Option<RaceRecord>,
    pub longest_run: Option<ActivityRef>,
    pub longest_ride: Option<ActivityRef>,
    pub longest_swim: Option<ActivityRef>,
    pub most_elevation: Option<ActivityRef>,
    pub most_calories: Option<ActivityRef>,
    pub highest_heart_rate: Option<HeartRateRecord>,
    /// Longest run of consecutive active calendar days
    pub longest_streak: u32,
}

/// Compute the personal records of a set of activities.
///
/// Heart rates above `max_plausible_heart_rate` are treated as sensor artifacts.
pub fn compute_records(activities: &[Activity], max_plausible_heart_rate: f64) -> PersonalRecords {
    let runs: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.category == SportCategory::Running)
        .collect();

    PersonalRecords {
        fastest_5k: fastest_in_band(&runs, RaceBand::FIVE_K),
        fastest_10k: fastest_in_band(&runs, RaceBand::TEN_K),
        fastest_half_marathon: fastest_in_band(&runs, RaceBand::HALF_MARATHON),
        fastest_marathon: fastest_in_band(&runs, RaceBand::MARATHON),
        longest_run: longest_of(activities, SportCategory::Running),
        longest_ride: longest_of(activities, SportCategory::Cycling),
        longest_swim: longest_of(activities, SportCategory::Swimming),
        most_elevation: max_by_value(activities, |a| a.elevation_gain),
        most_calories: max_by_value(activities, |a| a.calories),
        highest_heart_rate: highest_heart_rate(activities, max_plausible_heart_rate),
        longest_streak: longest_streak(activities.iter().map(Activity::date)),
    }
}

fn fastest_in_band(runs: &[&Activity], band: RaceBand) -> Option<RaceRecord> {
    let mut best: Option<&Activity> = None;
    for run in runs {
        if !band.contains(run.distance) || run.duration <= 0.0 {
            continue;
        }
        if best.map_or(true, |b| run.duration < b.duration) {
            best = Some(*run);
        }
    }

    best.map(|activity| RaceRecord {
        time: activity.duration,
        date: activity.date(),
        activity: ActivityRef::from(activity),
    })
}

fn longest_of(activities: &[Activity], category: SportCategory) -> Option<ActivityRef> {
    let mut best: Option<&Activity> = None;
    for activity in activities.iter().filter(|a| a.category == category) {
        if activity.distance > 0.0 && best.map_or(true, |b| activity.distance > b.distance) {
            best = Some(activity);
        }
    }
    best.map(ActivityRef::from)
}

fn max_by_value<F>(activities: &[Activity], value: F) -> Option<ActivityRef>
where
    F: Fn(&Activity) -> Option<f64>,
{
    let mut best: Option<(&Activity, f64)> = None;
    for activity in activities {
        let Some(v) = value(activity).filter(|v| *v > 0.0) else {
            continue;
        };
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((activity, v));
        }
    }
    best.map(|(activity, _)| ActivityRef::from(activity))
}

fn highest_heart_rate(activities: &[Activity], ceiling: f64) -> Option<HeartRateRecord> {
    let mut best: Option<(&Activity, f64)> = None;
    for activity in activities {
        let Some(hr) = activity
            .max_heart_rate
            .filter(|hr| *hr > 0.0 && *hr <= ceiling)
        else {
            continue;
        };
        if best.map_or(true, |(_, b)| hr > b) {
            best = Some((activity, hr));
        }
    }
    best.map(|(activity, value)| HeartRateRecord {
        value,
        activity: ActivityRef::from(activity),
    })
}

/// Longest run of consecutive calendar days among `dates`.
///
/// Duplicate days count once. Returns 0 for no dates and at least 1 otherwise.
pub fn longest_streak<I>(dates: I) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();

    let mut longest = 0u32;
    let mut current = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        current = match previous {
            Some(prev) if (day - prev).num_days() == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(day);
    }

    longest
}

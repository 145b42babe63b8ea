use chrono::{Datelike, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::models::{round_to, Activity};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Sunday first, matching the weekday bucket index
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    /// 1 - 12
    pub month: u32,
    pub activities: u32,
    /// Kilometers
    pub distance: f64,
    /// Hours
    pub duration: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayStats {
    /// 0 = Sunday
    pub day: u32,
    pub day_name: String,
    pub activities: u32,
    /// Kilometers
    pub total_distance: f64,
    pub avg_distance: f64,
    /// Hours
    pub duration: f64,
    pub calories: f64,
}

/// Twelve month buckets, index = month - 1, always all present
pub fn monthly_buckets(activities: &[Activity]) -> [MonthlyStats; 12] {
    let mut months: [MonthlyStats; 12] = std::array::from_fn(|index| MonthlyStats {
        month: index as u32 + 1,
        activities: 0,
        distance: 0.0,
        duration: 0.0,
        calories: 0.0,
    });

    for activity in activities {
        let bucket = &mut months[activity.start_time.month0() as usize];
        bucket.activities += 1;
        bucket.distance += activity.distance_km();
        bucket.duration += activity.duration_hours();
        bucket.calories += activity.calories.unwrap_or(0.0);
    }

    months
}

/// Seven weekday buckets, index 0 = Sunday, always all present
pub fn weekday_buckets(activities: &[Activity]) -> [WeekdayStats; 7] {
    let mut days: [WeekdayStats; 7] = std::array::from_fn(|index| WeekdayStats {
        day: index as u32,
        day_name: WEEKDAY_NAMES[index].to_string(),
        activities: 0,
        total_distance: 0.0,
        avg_distance: 0.0,
        duration: 0.0,
        calories: 0.0,
    });

    for activity in activities {
        let bucket = &mut days[activity.start_time.weekday().num_days_from_sunday() as usize];
        bucket.activities += 1;
        bucket.total_distance += activity.distance_km();
        bucket.duration += activity.duration_hours();
        bucket.calories += activity.calories.unwrap_or(0.0);
    }

    for bucket in days.iter_mut() {
        if bucket.activities > 0 {
            bucket.avg_distance = bucket.total_distance / f64::from(bucket.activities);
        }
    }

    days
}

/// Activity count per local start hour
pub fn hourly_distribution(activities: &[Activity]) -> [u32; 24] {
    let mut hours = [0u32; 24];
    for activity in activities {
        hours[activity.start_time.hour() as usize] += 1;
    }
    hours
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Morning 05-11, afternoon 12-16, evening 17-20, night 21-04
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Slot with the most activities; ties go to the earlier slot in the day
    pub fn preferred(hourly: &[u32; 24]) -> Self {
        let mut counts = [0u32; 4];
        for (hour, count) in hourly.iter().enumerate() {
            counts[TimeOfDay::from_hour(hour as u32) as usize] += count;
        }

        let order = [
            TimeOfDay::Morning,
            TimeOfDay::Afternoon,
            TimeOfDay::Evening,
            TimeOfDay::Night,
        ];
        let mut best = TimeOfDay::Morning;
        for slot in order {
            if counts[slot as usize] > counts[best as usize] {
                best = slot;
            }
        }
        best
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPersonality {
    AllRounder,
    HighFlyer,
    ConsistencyKing,
    KilometerCollector,
    EarlyBird,
    EveningAthlete,
    EnduranceChampion,
}

/// Inputs for classifying a training personality
#[derive(Debug, Clone, Copy)]
pub struct PersonalityInputs {
    pub distinct_categories: usize,
    pub total_elevation: f64,
    pub longest_streak: u32,
    pub total_distance_km: f64,
    pub preferred_time: TimeOfDay,
}

impl TrainingPersonality {
    /// First matching rule wins
    pub fn classify(inputs: &PersonalityInputs) -> Self {
        if inputs.distinct_categories >= 4 {
            TrainingPersonality::AllRounder
        } else if inputs.total_elevation > 30_000.0 {
            TrainingPersonality::HighFlyer
        } else if inputs.longest_streak >= 14 {
            TrainingPersonality::ConsistencyKing
        } else if inputs.total_distance_km > 3000.0 {
            TrainingPersonality::KilometerCollector
        } else {
            match inputs.preferred_time {
                TimeOfDay::Morning => TrainingPersonality::EarlyBird,
                TimeOfDay::Evening | TimeOfDay::Night => TrainingPersonality::EveningAthlete,
                TimeOfDay::Afternoon => TrainingPersonality::EnduranceChampion,
            }
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrainingPersonality::AllRounder => "The All-Rounder",
            TrainingPersonality::HighFlyer => "The High Flyer",
            TrainingPersonality::ConsistencyKing => "The Consistency King",
            TrainingPersonality::KilometerCollector => "The Kilometer Collector",
            TrainingPersonality::EarlyBird => "The Early Bird",
            TrainingPersonality::EveningAthlete => "The Evening Athlete",
            TrainingPersonality::EnduranceChampion => "The Endurance Champion",
        }
    }
}

impl fmt::Display for TrainingPersonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPatterns {
    pub preferred_time_of_day: TimeOfDay,
    pub most_active_hour: u32,
    /// 0 - 100
    pub consistency: u32,
    pub training_personality: TrainingPersonality,
    pub hourly_distribution: [u32; 24],
    pub active_days: Vec<NaiveDate>,
}

/// Hour-of-day and regularity analysis, `None` without activities
pub fn training_patterns(
    activities: &[Activity],
    total_elevation: f64,
    longest_streak: u32,
) -> Option<TrainingPatterns> {
    if activities.is_empty() {
        return None;
    }

    let hourly = hourly_distribution(activities);
    let most_active_hour = most_active_hour(&hourly);
    let preferred = TimeOfDay::preferred(&hourly);

    let active_days: Vec<NaiveDate> = activities
        .iter()
        .map(Activity::date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let consistency = consistency_score(active_days.len());

    let distinct_categories = activities
        .iter()
        .map(|a| a.category)
        .collect::<BTreeSet<_>>()
        .len();
    let total_distance_km: f64 = activities.iter().map(Activity::distance_km).sum();

    let personality = TrainingPersonality::classify(&PersonalityInputs {
        distinct_categories,
        total_elevation,
        longest_streak,
        total_distance_km,
        preferred_time: preferred,
    });

    Some(TrainingPatterns {
        preferred_time_of_day: preferred,
        most_active_hour,
        consistency,
        training_personality: personality,
        hourly_distribution: hourly,
        active_days,
    })
}

/// First hour with the highest count
pub fn most_active_hour(hourly: &[u32; 24]) -> u32 {
    let mut best = 0usize;
    for (hour, count) in hourly.iter().enumerate() {
        if *count > hourly[best] {
            best = hour;
        }
    }
    best as u32
}

/// Active days relative to half the year, capped at 100
pub fn consistency_score(active_days: usize) -> u32 {
    let score = round_to(active_days as f64 / 365.0 * 200.0, 0);
    score.min(100.0) as u32
}

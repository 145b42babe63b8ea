//! Achievement badges
//!
//! Tiered families award at most one badge each: tiers are checked from the highest
//! threshold down and the first one reached wins. The remaining badges are independent
//! checks that can all be earned in the same year.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::Activity;
use crate::power::CyclingPowerAnalytics;
use crate::records::PersonalRecords;
use crate::running::RunningFormAnalytics;
use crate::training_effect::TemperatureStats;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub badges: Vec<Badge>,
    pub total_badges: usize,
    pub has_badges: bool,
}

/// One tier of a badge family
#[derive(Debug, Clone, Copy)]
struct Tier {
    threshold: f64,
    id: &'static str,
    name: &'static str,
    emoji: &'static str,
    description: &'static str,
}

impl Tier {
    const fn new(
        threshold: f64,
        id: &'static str,
        name: &'static str,
        emoji: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            threshold,
            id,
            name,
            emoji,
            description,
        }
    }

    fn badge(&self) -> Badge {
        Badge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            emoji: self.emoji.to_string(),
            description: self.description.to_string(),
        }
    }
}

const DISTANCE_TIERS: [Tier; 4] = [
    Tier::new(5000.0, "distance_5000", "Globetrotter", "🌍", "5,000+ km covered"),
    Tier::new(2500.0, "distance_2500", "Kilometer Eater", "🛤️", "2,500+ km covered"),
    Tier::new(1000.0, "distance_1000", "Thousand Club", "🏃", "1,000+ km covered"),
    Tier::new(500.0, "distance_500", "Distance Hunter", "🚀", "500+ km covered"),
];

const ELEVATION_TIERS: [Tier; 4] = [
    Tier::new(50000.0, "elevation_50k", "Everest x5", "🦅", "50,000+ m climbed"),
    Tier::new(25000.0, "elevation_25k", "Mountain Goat", "🏔️", "25,000+ m climbed"),
    Tier::new(10000.0, "elevation_10k", "Summit Seeker", "⛰️", "10,000+ m climbed"),
    Tier::new(5000.0, "elevation_5k", "Hill King", "🗻", "5,000+ m climbed"),
];

const ACTIVE_DAY_TIERS: [Tier; 4] = [
    Tier::new(300.0, "consistent_300", "Unstoppable", "👑", "Trained on 300+ days"),
    Tier::new(200.0, "consistent_200", "Iron Will", "🔩", "Trained on 200+ days"),
    Tier::new(100.0, "consistent_100", "Steady", "🎯", "Trained on 100+ days"),
    Tier::new(50.0, "consistent_50", "Regular", "📅", "Trained on 50+ days"),
];

const STREAK_TIERS: [Tier; 3] = [
    Tier::new(30.0, "streak_30", "Month Warrior", "🔥", "Active 30 days in a row"),
    Tier::new(14.0, "streak_14", "Two Week Warrior", "⚡", "Active 14 days in a row"),
    Tier::new(7.0, "streak_7", "Week Winner", "✨", "Active 7 days in a row"),
];

const PEAK_POWER_TIERS: [Tier; 2] = [
    Tier::new(1000.0, "power_1000", "Power Pack", "⚡", "1,000+ W peak power"),
    Tier::new(500.0, "power_500", "Powerhouse", "💥", "500+ W peak power"),
];

const ACTIVITY_COUNT_TIERS: [Tier; 4] = [
    Tier::new(500.0, "activities_500", "Machine", "🤖", "500+ workouts completed"),
    Tier::new(300.0, "activities_300", "Evergreen", "🏆", "300+ workouts completed"),
    Tier::new(100.0, "activities_100", "Centurion", "💯", "100+ workouts completed"),
    Tier::new(50.0, "activities_50", "Riser", "🌱", "50+ workouts completed"),
];

const HIGH_IMPACT_TIERS: [Tier; 3] = [
    Tier::new(50.0, "high_impact_50", "Beast Mode", "🦁", "50+ hard workouts"),
    Tier::new(20.0, "high_impact", "Limit Pusher", "💪", "20+ hard workouts"),
    Tier::new(10.0, "high_impact_10", "Pusher", "🔋", "10+ hard workouts"),
];

const VARIETY_TIERS: [Tier; 3] = [
    Tier::new(7.0, "variety_7", "Multi Talent", "🎪", "7+ different sports"),
    Tier::new(5.0, "variety", "All-Rounder", "🎯", "5+ different sports"),
    Tier::new(3.0, "variety_3", "Versatile", "🔄", "3+ different sports"),
];

const SWEAT_TIERS: [Tier; 4] = [
    Tier::new(500.0, "sweat_500", "Waterfall", "🌊", "500+ liters of sweat lost"),
    Tier::new(200.0, "sweat_200", "Sweat Machine", "💦", "200+ liters of sweat lost"),
    Tier::new(100.0, "sweat_100", "Sweat Master", "💧", "100+ liters of sweat lost"),
    Tier::new(50.0, "sweat_50", "Drop Catcher", "🫗", "50+ liters of sweat lost"),
];

const FORM_GCT: Tier =
    Tier::new(240.0, "form_gct", "Light Foot", "🦶", "Efficient running technique");
const FORM_CADENCE: Tier =
    Tier::new(180.0, "form_cadence", "Cadence King", "👟", "Optimal step rate");
const COLD_WARRIOR: Tier =
    Tier::new(10.0, "cold_warrior", "Frost Proof", "❄️", "Trains in the cold too");
const HEAT_WARRIOR: Tier =
    Tier::new(10.0, "heat_warrior", "Heat Resistant", "☀️", "Trains in the heat too");
const RACE_MARATHON: Tier =
    Tier::new(0.0, "race_marathon", "Marathoner", "🏆", "Finished a marathon");
const RACE_HALF: Tier =
    Tier::new(0.0, "race_half", "Half Marathoner", "🥇", "Finished a half marathon");
const RACE_10K: Tier = Tier::new(0.0, "race_10k", "10K Finisher", "🥈", "Ran 10 km in one go");
const RACE_5K: Tier = Tier::new(0.0, "race_5k", "5K Finisher", "🏅", "Ran 5 km in one go");
const CENTURY_RIDE: Tier =
    Tier::new(100.0, "century_ride", "Century Rider", "🚴", "Completed a 100+ km ride");

/// Running form entries needed for the form badges
const MIN_FORM_ENTRIES_FOR_BADGES: usize = 10;

/// Rides with power needed for the peak power badges
const MIN_POWER_ENTRIES_FOR_BADGES: usize = 5;

/// Training effect entries needed for the high impact badges
const MIN_EFFECT_ENTRIES_FOR_BADGES: usize = 10;

/// Aerobic or anaerobic effect at which a workout counts as hard
const HIGH_IMPACT_EFFECT: f64 = 4.0;

/// Everything badge rules look at
#[derive(Debug, Clone, Copy)]
pub struct BadgeInputs<'a> {
    pub activities: &'a [Activity],
    pub records: &'a PersonalRecords,
    /// km
    pub total_distance: f64,
    /// meters
    pub total_elevation: f64,
    pub active_days: usize,
    pub running_form: Option<&'a RunningFormAnalytics>,
    pub cycling_power: Option<&'a CyclingPowerAnalytics>,
    pub temperature: Option<&'a TemperatureStats>,
}

fn first_tier(tiers: &[Tier], value: f64) -> Option<Badge> {
    tiers
        .iter()
        .find(|tier| value >= tier.threshold)
        .map(Tier::badge)
}

/// Evaluate all badge rules
pub fn evaluate_badges(inputs: &BadgeInputs<'_>) -> Achievements {
    let mut badges: Vec<Badge> = Vec::new();
    let activities = inputs.activities;
    let records = inputs.records;

    badges.extend(first_tier(&DISTANCE_TIERS, inputs.total_distance));
    badges.extend(first_tier(&ELEVATION_TIERS, inputs.total_elevation));
    badges.extend(first_tier(&ACTIVE_DAY_TIERS, inputs.active_days as f64));
    badges.extend(first_tier(&STREAK_TIERS, f64::from(records.longest_streak)));

    if let Some(form) = inputs
        .running_form
        .filter(|f| f.data_points >= MIN_FORM_ENTRIES_FOR_BADGES)
    {
        if form
            .avg_ground_contact_time
            .map_or(false, |gct| gct < FORM_GCT.threshold)
        {
            badges.push(FORM_GCT.badge());
        }
        if form
            .avg_cadence
            .map_or(false, |cadence| cadence >= FORM_CADENCE.threshold)
        {
            badges.push(FORM_CADENCE.badge());
        }
    }

    if let Some(power) = inputs
        .cycling_power
        .filter(|p| p.data_points >= MIN_POWER_ENTRIES_FOR_BADGES)
    {
        if let Some(max_power) = power.max_power {
            badges.extend(first_tier(&PEAK_POWER_TIERS, max_power));
        }
    }

    if let Some(temperature) = inputs.temperature {
        if temperature.cold_activities as f64 >= COLD_WARRIOR.threshold {
            badges.push(COLD_WARRIOR.badge());
        }
        if temperature.hot_activities as f64 >= HEAT_WARRIOR.threshold {
            badges.push(HEAT_WARRIOR.badge());
        }
    }

    badges.extend(first_tier(&ACTIVITY_COUNT_TIERS, activities.len() as f64));

    let effects: Vec<(f64, f64)> = activities
        .iter()
        .filter(|a| !a.training_effect.is_empty())
        .map(|a| {
            (
                a.training_effect.aerobic.unwrap_or(0.0),
                a.training_effect.anaerobic.unwrap_or(0.0),
            )
        })
        .collect();
    if effects.len() >= MIN_EFFECT_ENTRIES_FOR_BADGES {
        let high_impact = effects
            .iter()
            .filter(|(aerobic, anaerobic)| {
                *aerobic >= HIGH_IMPACT_EFFECT || *anaerobic >= HIGH_IMPACT_EFFECT
            })
            .count();
        badges.extend(first_tier(&HIGH_IMPACT_TIERS, high_impact as f64));
    }

    let sport_types = activities
        .iter()
        .map(Activity::type_key)
        .collect::<BTreeSet<_>>()
        .len();
    badges.extend(first_tier(&VARIETY_TIERS, sport_types as f64));

    if records.fastest_marathon.is_some() {
        badges.push(RACE_MARATHON.badge());
    } else if records.fastest_half_marathon.is_some() {
        badges.push(RACE_HALF.badge());
    }
    if records.fastest_10k.is_some() {
        badges.push(RACE_10K.badge());
    }
    if records.fastest_5k.is_some() {
        badges.push(RACE_5K.badge());
    }

    if records
        .longest_ride
        .as_ref()
        .map_or(false, |ride| ride.distance_km >= CENTURY_RIDE.threshold)
    {
        badges.push(CENTURY_RIDE.badge());
    }

    let sweat_liters: f64 = activities.iter().filter_map(|a| a.sweat_loss_ml).sum::<f64>() / 1000.0;
    badges.extend(first_tier(&SWEAT_TIERS, sweat_liters));

    tracing::debug!(count = badges.len(), "Badges evaluated");

    Achievements {
        total_badges: badges.len(),
        has_badges: !badges.is_empty(),
        badges,
    }
}

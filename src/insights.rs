//! Fun facts and the epic moment of the year
//!
//! Insights are produced by a fixed rule table over the year totals and buckets. Every rule
//! has a threshold; a year that does not reach it simply yields fewer insights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::aggregator::SportStats;
use crate::buckets::{MonthlyStats, WeekdayStats, MONTH_NAMES};
use crate::models::{Activity, ActivityRef, SportCategory};

/// Equatorial circumference of the earth in km
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40075.0;

/// Marathon distance in km
pub const MARATHON_KM: f64 = 42.195;

/// Half marathon distance in km
pub const HALF_MARATHON_KM: f64 = 21.0975;

/// Height of Mount Everest in meters
pub const EVEREST_M: f64 = 8849.0;

/// Calories of one large pizza
pub const PIZZA_KCAL: f64 = 800.0;

/// Length of one feature film in hours
pub const MOVIE_HOURS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    FunFact,
    Achievement,
    Comparison,
    Trend,
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightKind::FunFact => write!(f, "fun fact"),
            InsightKind::Achievement => write!(f, "achievement"),
            InsightKind::Comparison => write!(f, "comparison"),
            InsightKind::Trend => write!(f, "trend"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub value: String,
    pub description: String,
    pub icon: String,
}

impl Insight {
    fn new(
        kind: InsightKind,
        title: &str,
        value: impl Into<String>,
        description: impl Into<String>,
        icon: &str,
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            value: value.into(),
            description: description.into(),
            icon: icon.to_string(),
        }
    }
}

/// Everything the insight rules look at
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    /// Activities counted in the totals
    pub activities: &'a [Activity],
    /// km
    pub total_distance: f64,
    /// hours
    pub total_duration: f64,
    /// meters
    pub total_elevation: f64,
    pub total_calories: f64,
    pub monthly: &'a [MonthlyStats; 12],
    pub weekdays: &'a [WeekdayStats; 7],
    pub longest_streak: u32,
}

/// Evaluate the insight rules in their fixed order
pub fn generate_insights(ctx: &InsightContext<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    let earth_percent = ctx.total_distance / EARTH_CIRCUMFERENCE_KM * 100.0;
    if earth_percent >= 1.0 {
        insights.push(Insight::new(
            InsightKind::FunFact,
            "Around the World",
            format!("{:.1}%", earth_percent),
            format!(
                "You covered {:.0} km, that is {:.1}% of the earth's circumference!",
                ctx.total_distance, earth_percent
            ),
            "🌍",
        ));
    }

    let marathons = ctx.total_distance / MARATHON_KM;
    if marathons >= 1.0 {
        insights.push(Insight::new(
            InsightKind::FunFact,
            "Marathon Equivalent",
            format!("{:.1}x", marathons),
            format!("Your total distance equals {:.1} marathons!", marathons),
            "🏃",
        ));
    }

    if let Some(month) = busiest(ctx.monthly.iter(), |m| m.activities) {
        let name = MONTH_NAMES[(month.month - 1) as usize];
        insights.push(Insight::new(
            InsightKind::Trend,
            "Most Active Month",
            name,
            format!(
                "{} was your most active month with {} activities!",
                name, month.activities
            ),
            "📅",
        ));
    }

    if let Some(day) = busiest(ctx.weekdays.iter(), |d| d.activities) {
        insights.push(Insight::new(
            InsightKind::Trend,
            "Favorite Day",
            day.day_name.clone(),
            format!(
                "{} is your training day! {} activities on {}s.",
                day.day_name, day.activities, day.day_name
            ),
            "🗓️",
        ));
    }

    if let Some(insight) = time_of_day_insight(ctx.activities) {
        insights.push(insight);
    }

    if ctx.longest_streak >= 7 {
        insights.push(Insight::new(
            InsightKind::Achievement,
            "Longest Streak",
            format!("{} days", ctx.longest_streak),
            format!(
                "Your longest training streak: {} days in a row!",
                ctx.longest_streak
            ),
            "🔥",
        ));
    }

    let pizzas = (ctx.total_calories / PIZZA_KCAL).floor();
    if pizzas >= 10.0 {
        insights.push(Insight::new(
            InsightKind::FunFact,
            "Pizza Power",
            format!("{:.0} pizzas", pizzas),
            format!("You burned enough calories for {:.0} pizzas!", pizzas),
            "🍕",
        ));
    }

    let everests = ctx.total_elevation / EVEREST_M;
    if everests >= 0.5 {
        insights.push(Insight::new(
            InsightKind::FunFact,
            "High Flyer",
            format!("{:.1}x Everest", everests),
            format!(
                "{:.0} m of climbing, that is {:.1} times Mount Everest!",
                ctx.total_elevation, everests
            ),
            "🏔️",
        ));
    }

    let movies = (ctx.total_duration / MOVIE_HOURS).floor();
    if movies >= 20.0 {
        insights.push(Insight::new(
            InsightKind::FunFact,
            "Time Invested",
            format!("{:.0} hours", ctx.total_duration),
            format!(
                "You could have watched {:.0} movies, but training was the better choice!",
                movies
            ),
            "⏱️",
        ));
    }

    insights
}

/// First bucket with the highest non-zero count
fn busiest<'a, T, I, F>(buckets: I, count: F) -> Option<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> u32,
{
    let mut best: Option<&'a T> = None;
    for bucket in buckets {
        if best.map_or(true, |b| count(bucket) > count(b)) {
            best = Some(bucket);
        }
    }
    best.filter(|b| count(b) > 0)
}

/// Morning (before 12:00) against evening (from 17:00) when one side dominates by 1.5x
fn time_of_day_insight(activities: &[Activity]) -> Option<Insight> {
    use chrono::Timelike;

    let morning = activities
        .iter()
        .filter(|a| a.start_time.hour() < 12)
        .count();
    let evening = activities
        .iter()
        .filter(|a| a.start_time.hour() >= 17)
        .count();

    if morning as f64 > evening as f64 * 1.5 {
        Some(Insight::new(
            InsightKind::Trend,
            "Early Riser",
            format!("{} morning workouts", morning),
            "You are a true early bird! Most of your activities happen in the morning.",
            "🌅",
        ))
    } else if evening as f64 > morning as f64 * 1.5 {
        Some(Insight::new(
            InsightKind::Trend,
            "Night Owl",
            format!("{} evening workouts", evening),
            "You like to train in the evening! That fits your rhythm.",
            "🌙",
        ))
    } else {
        None
    }
}

/// The single most remarkable activity of the year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicMoment {
    pub activity: ActivityRef,
    pub reason: String,
    pub emoji: String,
    pub sport: SportCategory,
    pub epic_score: f64,
    pub comparison_text: Option<String>,
}

/// Categories whose longest activity competes for the epic moment
const EPIC_SPORTS: [SportCategory; 5] = [
    SportCategory::Running,
    SportCategory::Cycling,
    SportCategory::Swimming,
    SportCategory::Hiking,
    SportCategory::Walking,
];

/// Elevation gain that turns a longest activity into an elevation candidate, meters
const ELEVATION_MONSTER_M: f64 = 1000.0;

/// Pick the epic moment among the longest activities of the endurance sports.
///
/// Highest score wins; on equal scores the earlier candidate is kept.
pub fn find_epic_moment(by_sport: &BTreeMap<SportCategory, SportStats>) -> Option<EpicMoment> {
    let longest: Vec<(&SportStats, &ActivityRef)> = EPIC_SPORTS
        .iter()
        .filter_map(|sport| by_sport.get(sport))
        .filter_map(|stats| stats.longest.as_ref().map(|activity| (stats, activity)))
        .collect();

    let mut candidates: Vec<EpicMoment> = longest
        .iter()
        .map(|(stats, activity)| distance_candidate(stats, activity))
        .collect();

    candidates.extend(longest.iter().filter_map(|(stats, activity)| {
        let gain = activity.elevation_gain.filter(|g| *g >= ELEVATION_MONSTER_M)?;
        Some(EpicMoment {
            activity: (*activity).clone(),
            reason: "Your elevation monster".to_string(),
            emoji: "⛰️".to_string(),
            sport: stats.category,
            epic_score: 60.0 + gain / 100.0,
            comparison_text: Some(format!("{:.0} m climbed", gain)),
        })
    }));

    let mut best: Option<EpicMoment> = None;
    for candidate in candidates {
        if best
            .as_ref()
            .map_or(true, |b| candidate.epic_score > b.epic_score)
        {
            best = Some(candidate);
        }
    }
    best
}

fn distance_candidate(stats: &SportStats, activity: &ActivityRef) -> EpicMoment {
    let distance_km = activity.distance_km;

    let reason = match stats.category {
        SportCategory::Running if distance_km >= MARATHON_KM => "Your marathon".to_string(),
        SportCategory::Running if distance_km >= HALF_MARATHON_KM => {
            "Your half marathon".to_string()
        }
        SportCategory::Running if distance_km >= 10.0 => "Your 10K+ run".to_string(),
        SportCategory::Cycling if distance_km >= 100.0 => "Your century ride".to_string(),
        category => format!("Your longest {}", sport_noun(category)),
    };

    let comparison_text = (stats.avg_distance > 0.0)
        .then(|| distance_km / stats.avg_distance)
        .filter(|ratio| *ratio > 1.5)
        .map(|ratio| {
            format!(
                "{:.0}% longer than your average",
                ((ratio - 1.0) * 100.0).round()
            )
        });

    EpicMoment {
        activity: activity.clone(),
        reason,
        emoji: sport_emoji(stats.category).to_string(),
        sport: stats.category,
        epic_score: epic_score(activity, stats.avg_distance, stats.avg_duration, stats.category),
        comparison_text,
    }
}

/// Score an activity against its category averages (km and hours).
///
/// Rides earn a bonus for a century only; race-distance bonuses apply to the other sports.
pub fn epic_score(
    activity: &ActivityRef,
    avg_distance_km: f64,
    avg_duration_hours: f64,
    category: SportCategory,
) -> f64 {
    let mut score = 0.0;

    if avg_distance_km > 0.0 {
        score += (activity.distance_km / avg_distance_km * 30.0).min(50.0);
    }
    if avg_duration_hours > 0.0 {
        let hours = activity.duration_seconds / 3600.0;
        score += (hours / avg_duration_hours * 20.0).min(30.0);
    }
    if let Some(gain) = activity.elevation_gain.filter(|g| *g > 500.0) {
        score += (gain / 100.0).min(20.0);
    }

    let km = activity.distance_km;
    score += if category == SportCategory::Cycling {
        match km {
            d if d >= 100.0 => 40.0,
            d if d >= 10.0 => 15.0,
            _ => 0.0,
        }
    } else {
        match km {
            d if d >= MARATHON_KM => 50.0,
            d if d >= HALF_MARATHON_KM => 35.0,
            d if d >= 10.0 => 15.0,
            _ => 0.0,
        }
    };

    score
}

fn sport_noun(category: SportCategory) -> &'static str {
    match category {
        SportCategory::Running => "run",
        SportCategory::Cycling => "ride",
        SportCategory::Swimming => "swim",
        SportCategory::Hiking => "hike",
        SportCategory::Walking => "walk",
        SportCategory::Strength => "strength session",
        SportCategory::Yoga => "yoga session",
        SportCategory::Other => "activity",
    }
}

/// Display emoji per category
pub fn sport_emoji(category: SportCategory) -> &'static str {
    match category {
        SportCategory::Running => "🏃",
        SportCategory::Cycling => "🚴",
        SportCategory::Swimming => "🏊",
        SportCategory::Hiking => "🥾",
        SportCategory::Walking => "🚶",
        SportCategory::Strength => "💪",
        SportCategory::Yoga => "🧘",
        SportCategory::Other => "🏆",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_by_sport;
    use crate::buckets::{monthly_buckets, weekday_buckets};
    use chrono::NaiveDate;

    fn activity(
        category: SportCategory,
        month: u32,
        day: u32,
        hour: u32,
        meters: f64,
        seconds: f64,
    ) -> Activity {
        let start = NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        Activity::new(
            format!("{}-{}-{}", month, day, hour),
            category,
            "Session",
            start,
            meters,
            seconds,
        )
    }

    fn insights_for(activities: &[Activity], streak: u32) -> Vec<Insight> {
        let monthly = monthly_buckets(activities);
        let weekdays = weekday_buckets(activities);
        let ctx = InsightContext {
            activities,
            total_distance: activities.iter().map(Activity::distance_km).sum(),
            total_duration: activities.iter().map(Activity::duration_hours).sum(),
            total_elevation: activities.iter().filter_map(|a| a.elevation_gain).sum(),
            total_calories: activities.iter().filter_map(|a| a.calories).sum(),
            monthly: &monthly,
            weekdays: &weekdays,
            longest_streak: streak,
        };
        generate_insights(&ctx)
    }

    #[test]
    fn test_empty_year_has_no_insights() {
        assert!(insights_for(&[], 0).is_empty());
    }

    #[test]
    fn test_insight_rules_and_order() {
        // 2024-03-05 is a Tuesday
        let mut activities: Vec<Activity> = (0..10)
            .map(|i| activity(SportCategory::Running, 3, 5 + i, 7, 50_000.0, 18_000.0))
            .collect();
        for activity in &mut activities {
            activity.calories = Some(900.0);
            activity.elevation_gain = Some(500.0);
        }

        let insights = insights_for(&activities, 10);
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Around the World",
                "Marathon Equivalent",
                "Most Active Month",
                "Favorite Day",
                "Early Riser",
                "Longest Streak",
                "Pizza Power",
                "High Flyer",
                "Time Invested",
            ]
        );

        // 500 km of 40075 km
        assert_eq!(insights[0].value, "1.2%");
        assert_eq!(insights[1].value, "11.8x");
        assert_eq!(insights[2].value, "March");
        assert_eq!(insights[5].value, "10 days");
        // 9000 kcal / 800 = 11.25
        assert_eq!(insights[6].value, "11 pizzas");
        // 5000 m / 8849 m
        assert_eq!(insights[7].value, "0.6x Everest");
        assert_eq!(insights[8].value, "50 hours");
        assert_eq!(insights[0].kind, InsightKind::FunFact);
        assert_eq!(insights[5].kind, InsightKind::Achievement);
    }

    #[test]
    fn test_thresholds_not_reached() {
        let activities = vec![activity(SportCategory::Walking, 6, 1, 18, 3000.0, 1800.0)];
        let insights = insights_for(&activities, 1);
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Most Active Month", "Favorite Day", "Night Owl"]);
    }

    #[test]
    fn test_balanced_day_has_no_time_of_day_insight() {
        let activities = vec![
            activity(SportCategory::Running, 6, 1, 7, 5000.0, 1500.0),
            activity(SportCategory::Running, 6, 2, 19, 5000.0, 1500.0),
        ];
        assert!(time_of_day_insight(&activities).is_none());
    }

    #[test]
    fn test_epic_moment_prefers_marathon() {
        let activities = vec![
            activity(SportCategory::Running, 4, 1, 8, 10_000.0, 3000.0),
            activity(SportCategory::Running, 4, 21, 8, 42_500.0, 14_400.0),
            activity(SportCategory::Walking, 5, 1, 8, 4000.0, 3000.0),
        ];
        let by_sport = aggregate_by_sport(&activities);
        let epic = find_epic_moment(&by_sport).unwrap();

        assert_eq!(epic.sport, SportCategory::Running);
        assert_eq!(epic.reason, "Your marathon");
        assert_eq!(epic.emoji, "🏃");
        // avg 26.25 km, ratio 1.619
        assert_eq!(
            epic.comparison_text.as_deref(),
            Some("62% longer than your average")
        );
    }

    #[test]
    fn test_century_ride_bonus() {
        let ride = activity(SportCategory::Cycling, 7, 1, 8, 120_000.0, 18_000.0);
        let reference = ActivityRef::from(&ride);
        // ratio 1 against itself: 30 + 20 + century 40
        let score = epic_score(&reference, 120.0, 5.0, SportCategory::Cycling);
        assert!((score - 90.0).abs() < 1e-9);

        let by_sport = aggregate_by_sport(&[ride]);
        let epic = find_epic_moment(&by_sport).unwrap();
        assert_eq!(epic.reason, "Your century ride");
        assert!(epic.comparison_text.is_none());
    }

    #[test]
    fn test_elevation_monster_candidate() {
        let mut hike = activity(SportCategory::Hiking, 8, 10, 6, 15_000.0, 21_600.0);
        hike.elevation_gain = Some(2500.0);
        let by_sport = aggregate_by_sport(&[hike]);
        let epic = find_epic_moment(&by_sport).unwrap();

        // Distance candidate: 30 + 20 + 20 + 15 = 85, elevation candidate: 60 + 25 = 85
        assert_eq!(epic.reason, "Your longest hike");

        let mut higher = activity(SportCategory::Hiking, 8, 10, 6, 15_000.0, 21_600.0);
        higher.elevation_gain = Some(3000.0);
        let epic = find_epic_moment(&aggregate_by_sport(&[higher])).unwrap();
        assert_eq!(epic.reason, "Your elevation monster");
        assert_eq!(epic.emoji, "⛰️");
        assert_eq!(epic.comparison_text.as_deref(), Some("3000 m climbed"));
    }

    #[test]
    fn test_no_epic_moment_without_endurance_sports() {
        let activities = vec![activity(SportCategory::Strength, 1, 3, 18, 0.0, 3600.0)];
        assert!(find_epic_moment(&aggregate_by_sport(&activities)).is_none());
    }
}

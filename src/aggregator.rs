use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{mean, Activity, ActivityRef, SportCategory};
use crate::taxonomy::SportTaxonomy;

/// Per-category totals and derived averages.
///
/// Distances are kilometers, durations hours, elevation meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportStats {
    pub category: SportCategory,
    pub count: u32,
    pub total_distance: f64,
    pub total_duration: f64,
    pub total_elevation: f64,
    pub total_calories: f64,
    pub avg_distance: f64,
    pub avg_duration: f64,
    /// Mean pace in min/km over members that recorded one
    pub avg_pace: Option<f64>,
    /// Mean speed in km/h over members that recorded one
    pub avg_speed: Option<f64>,
    pub best_pace: Option<f64>,
    pub best_speed: Option<f64>,
    pub longest: Option<ActivityRef>,
    pub fastest: Option<ActivityRef>,
}

/// Count, kilometers and hours for one display label inside a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtypeStats {
    pub display_name: String,
    pub count: u32,
    pub total_distance: f64,
    pub total_duration: f64,
}

/// Group activities by category and compute a [`SportStats`] for each one present
pub fn aggregate_by_sport(activities: &[Activity]) -> BTreeMap<SportCategory, SportStats> {
    let mut groups: BTreeMap<SportCategory, Vec<&Activity>> = BTreeMap::new();
    for activity in activities {
        groups.entry(activity.category).or_default().push(activity);
    }

    groups
        .into_iter()
        .map(|(category, members)| (category, sport_stats(category, &members)))
        .collect()
}

fn sport_stats(category: SportCategory, members: &[&Activity]) -> SportStats {
    let count = members.len() as u32;
    let total_distance: f64 = members.iter().map(|a| a.distance_km()).sum();
    let total_duration: f64 = members.iter().map(|a| a.duration_hours()).sum();
    let total_elevation: f64 = members.iter().filter_map(|a| a.elevation_gain).sum();
    let total_calories: f64 = members.iter().filter_map(|a| a.calories).sum();

    let paces: Vec<f64> = members
        .iter()
        .filter_map(|a| a.avg_pace)
        .filter(|pace| *pace > 0.0)
        .collect();
    let speeds: Vec<f64> = members
        .iter()
        .filter_map(|a| a.avg_speed)
        .filter(|speed| *speed > 0.0)
        .collect();

    let divisor = f64::from(count.max(1));

    SportStats {
        category,
        count,
        total_distance,
        total_duration,
        total_elevation,
        total_calories,
        avg_distance: total_distance / divisor,
        avg_duration: total_duration / divisor,
        avg_pace: mean(paces.iter().copied()),
        avg_speed: mean(speeds.iter().copied()),
        best_pace: paces.iter().copied().reduce(f64::min),
        best_speed: speeds.iter().copied().reduce(f64::max),
        longest: longest(members).map(ActivityRef::from),
        fastest: fastest(category, members).map(ActivityRef::from),
    }
}

/// Longest by distance; the first of equally long activities wins
fn longest<'a>(members: &[&'a Activity]) -> Option<&'a Activity> {
    let mut best: Option<&'a Activity> = None;
    for activity in members {
        if best.map_or(true, |b| activity.distance > b.distance) {
            best = Some(*activity);
        }
    }
    best
}

/// Lowest pace for foot sports, highest speed for cycling, nothing for the rest
fn fastest<'a>(category: SportCategory, members: &[&'a Activity]) -> Option<&'a Activity> {
    let mut best: Option<&'a Activity> = None;

    if category.uses_pace() {
        for activity in members {
            let Some(pace) = activity.avg_pace.filter(|p| *p > 0.0) else {
                continue;
            };
            if best.and_then(|b| b.avg_pace).map_or(true, |b| pace < b) {
                best = Some(*activity);
            }
        }
    } else if category == SportCategory::Cycling {
        for activity in members {
            let Some(speed) = activity.avg_speed.filter(|s| *s > 0.0) else {
                continue;
            };
            if best.and_then(|b| b.avg_speed).map_or(true, |b| speed > b) {
                best = Some(*activity);
            }
        }
    }

    best
}

/// Split one category by display label.
///
/// Keys are the lower-cased display name with whitespace replaced by `_`. Only the
/// categories with a display table (cycling, other) produce entries.
pub fn subtype_breakdown(
    activities: &[Activity],
    category: SportCategory,
    taxonomy: &SportTaxonomy,
) -> BTreeMap<String, SubtypeStats> {
    let mut breakdown: BTreeMap<String, SubtypeStats> = BTreeMap::new();

    for activity in activities.iter().filter(|a| a.category == category) {
        let label = activity.source_label.as_deref().unwrap_or("");
        let Some(display_name) = taxonomy.display_name(category, label) else {
            continue;
        };
        let key = display_key(&display_name);

        let entry = breakdown.entry(key).or_insert_with(|| SubtypeStats {
            display_name,
            count: 0,
            total_distance: 0.0,
            total_duration: 0.0,
        });
        entry.count += 1;
        entry.total_distance += activity.distance_km();
        entry.total_duration += activity.duration_hours();
    }

    breakdown
}

fn display_key(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn activity(id: &str, category: SportCategory, day: u32, km: f64, minutes: f64) -> Activity {
        let start = NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        Activity::new(id, category, id, start, km * 1000.0, minutes * 60.0)
    }

    #[test]
    fn test_totals_and_averages() {
        let mut run_a = activity("a", SportCategory::Running, 1, 10.0, 50.0);
        run_a.avg_pace = Some(5.0);
        run_a.elevation_gain = Some(100.0);
        run_a.calories = Some(700.0);
        let mut run_b = activity("b", SportCategory::Running, 2, 5.0, 30.0);
        run_b.avg_pace = Some(6.0);
        let ride = activity("c", SportCategory::Cycling, 3, 40.0, 90.0);

        let stats = aggregate_by_sport(&[run_a, run_b, ride]);
        assert_eq!(stats.len(), 2);

        let running = &stats[&SportCategory::Running];
        assert_eq!(running.count, 2);
        assert!((running.total_distance - 15.0).abs() < 1e-9);
        assert!((running.total_duration - 80.0 / 60.0).abs() < 1e-9);
        assert!((running.avg_distance - 7.5).abs() < 1e-9);
        assert_eq!(running.total_elevation, 100.0);
        assert_eq!(running.total_calories, 700.0);
        assert_eq!(running.avg_pace, Some(5.5));
        assert_eq!(running.best_pace, Some(5.0));
        assert_eq!(running.longest.as_ref().unwrap().id, "a");
        assert_eq!(running.fastest.as_ref().unwrap().id, "a");
        assert!(!stats.contains_key(&SportCategory::Swimming));
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let mut first = activity("first", SportCategory::Cycling, 1, 50.0, 100.0);
        first.avg_speed = Some(30.0);
        let mut second = activity("second", SportCategory::Cycling, 2, 50.0, 100.0);
        second.avg_speed = Some(30.0);

        let stats = aggregate_by_sport(&[first, second]);
        let cycling = &stats[&SportCategory::Cycling];
        assert_eq!(cycling.longest.as_ref().unwrap().id, "first");
        assert_eq!(cycling.fastest.as_ref().unwrap().id, "first");
        assert_eq!(cycling.best_speed, Some(30.0));
    }

    #[test]
    fn test_fastest_ignores_missing_and_zero_metrics() {
        let mut zero = activity("zero", SportCategory::Running, 1, 5.0, 25.0);
        zero.avg_pace = Some(0.0);
        let none = activity("none", SportCategory::Running, 2, 5.0, 25.0);
        let mut real = activity("real", SportCategory::Running, 3, 5.0, 25.0);
        real.avg_pace = Some(5.2);

        let stats = aggregate_by_sport(&[zero, none, real]);
        assert_eq!(
            stats[&SportCategory::Running].fastest.as_ref().unwrap().id,
            "real"
        );

        let yoga = aggregate_by_sport(&[activity("y", SportCategory::Yoga, 1, 0.0, 60.0)]);
        assert!(yoga[&SportCategory::Yoga].fastest.is_none());
        assert!(yoga[&SportCategory::Yoga].avg_pace.is_none());
    }

    #[test]
    fn test_subtype_breakdown() {
        let taxonomy = SportTaxonomy::new();
        let mut road = activity("r", SportCategory::Cycling, 1, 60.0, 120.0);
        road.source_label = Some("road_biking".to_string());
        let mut gravel = activity("g", SportCategory::Cycling, 2, 40.0, 120.0);
        gravel.source_label = Some("Gravel Cycling".to_string());
        let mut road_again = activity("r2", SportCategory::Cycling, 3, 30.0, 60.0);
        road_again.source_label = Some("Road Cycling".to_string());

        let breakdown = subtype_breakdown(
            &[road, gravel, road_again],
            SportCategory::Cycling,
            &taxonomy,
        );
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["road_bike"].count, 2);
        assert!((breakdown["road_bike"].total_distance - 90.0).abs() < 1e-9);
        assert_eq!(breakdown["gravel"].display_name, "Gravel");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_sport(&[]).is_empty());
        assert!(subtype_breakdown(&[], SportCategory::Other, &SportTaxonomy::new()).is_empty());
    }
}

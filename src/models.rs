use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use std::str::FromStr;

/// Canonical sport categories every source label is folded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportCategory {
    Running,
    Cycling,
    Swimming,
    Walking,
    Hiking,
    Strength,
    Yoga,
    Other,
}

impl SportCategory {
    /// All categories in display order
    pub const ALL: [SportCategory; 8] = [
        SportCategory::Running,
        SportCategory::Cycling,
        SportCategory::Swimming,
        SportCategory::Walking,
        SportCategory::Hiking,
        SportCategory::Strength,
        SportCategory::Yoga,
        SportCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportCategory::Running => "running",
            SportCategory::Cycling => "cycling",
            SportCategory::Swimming => "swimming",
            SportCategory::Walking => "walking",
            SportCategory::Hiking => "hiking",
            SportCategory::Strength => "strength",
            SportCategory::Yoga => "yoga",
            SportCategory::Other => "other",
        }
    }

    /// Foot-based categories whose speed is expressed as pace (min/km)
    pub fn uses_pace(&self) -> bool {
        matches!(
            self,
            SportCategory::Running | SportCategory::Walking | SportCategory::Hiking
        )
    }
}

impl fmt::Display for SportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SportCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown sport category: {}", s))
    }
}

/// Power meter summary for a single activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerMetrics {
    /// Average power in watts
    pub avg_power: Option<f64>,

    /// Peak power in watts
    pub max_power: Option<f64>,

    /// Normalized power in watts
    pub normalized_power: Option<f64>,

    /// Best 20 minute power, used as an FTP proxy
    pub max_20min_power: Option<f64>,

    /// Training stress score
    pub training_stress_score: Option<f64>,

    /// Intensity factor
    pub intensity_factor: Option<f64>,

    /// Left leg share of power (%)
    pub left_balance: Option<f64>,

    /// Right leg share of power (%)
    pub right_balance: Option<f64>,
}

/// Running dynamics reported by a foot pod or chest strap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningDynamics {
    /// Ground contact time in milliseconds
    pub ground_contact_time: Option<f64>,

    /// Vertical oscillation in centimeters
    pub vertical_oscillation: Option<f64>,

    /// Stride length in centimeters
    pub stride_length: Option<f64>,

    /// Running cadence in steps per minute
    pub cadence: Option<f64>,

    /// Vertical ratio (%)
    pub vertical_ratio: Option<f64>,

    /// Ground contact time balance, left share (%)
    pub ground_contact_balance: Option<f64>,
}

impl RunningDynamics {
    pub fn is_empty(&self) -> bool {
        self.ground_contact_time.is_none()
            && self.vertical_oscillation.is_none()
            && self.stride_length.is_none()
            && self.cadence.is_none()
            && self.vertical_ratio.is_none()
            && self.ground_contact_balance.is_none()
    }
}

/// Device-estimated training effect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingEffect {
    /// Aerobic training effect (0.0 - 5.0)
    pub aerobic: Option<f64>,

    /// Anaerobic training effect (0.0 - 5.0)
    pub anaerobic: Option<f64>,

    /// Primary benefit label, e.g. "TEMPO" or "VO2MAX"
    pub label: Option<String>,
}

impl TrainingEffect {
    pub fn is_empty(&self) -> bool {
        self.aerobic.is_none() && self.anaerobic.is_none()
    }
}

/// One normalized unit of exercise.
///
/// Distance and duration are always numeric (0 when the source had nothing). Every other
/// metric is `None` when the source did not provide a usable value; a zero is never used
/// to mean "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Source identifier, or a generated UUID when the source has none
    pub id: String,

    /// Canonical sport category
    pub category: SportCategory,

    /// Title as shown by the source
    pub name: String,

    /// Local wall-clock start time as recorded by the device
    pub start_time: NaiveDateTime,

    /// Distance in meters
    pub distance: f64,

    /// Elapsed duration in seconds
    pub duration: f64,

    /// Energy in kilocalories
    pub calories: Option<f64>,

    /// Total ascent in meters
    pub elevation_gain: Option<f64>,

    /// Total descent in meters
    pub elevation_loss: Option<f64>,

    /// Average heart rate in bpm
    pub avg_heart_rate: Option<f64>,

    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<f64>,

    /// Average pace in minutes per kilometer (foot sports)
    pub avg_pace: Option<f64>,

    /// Average speed in km/h
    pub avg_speed: Option<f64>,

    /// Maximum speed in km/h
    pub max_speed: Option<f64>,

    /// Average cadence (spm for foot sports, rpm for cycling)
    pub avg_cadence: Option<f64>,

    /// Maximum cadence
    pub max_cadence: Option<f64>,

    pub power: PowerMetrics,

    pub running_dynamics: RunningDynamics,

    pub training_effect: TrainingEffect,

    /// Lowest recorded temperature in °C
    pub min_temperature: Option<f64>,

    /// Highest recorded temperature in °C
    pub max_temperature: Option<f64>,

    /// Estimated sweat loss in milliliters
    pub sweat_loss_ml: Option<f64>,

    /// Average stress level during the activity
    pub avg_stress: Option<f64>,

    /// Sport label exactly as the source provided it
    pub source_label: Option<String>,

    /// Parent multisport activity when this is one of its segments
    pub parent_id: Option<String>,
}

impl Activity {
    /// Create an activity with only the required fields set
    pub fn new(
        id: impl Into<String>,
        category: SportCategory,
        name: impl Into<String>,
        start_time: NaiveDateTime,
        distance: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            start_time,
            distance: distance.max(0.0),
            duration: duration.max(0.0),
            calories: None,
            elevation_gain: None,
            elevation_loss: None,
            avg_heart_rate: None,
            max_heart_rate: None,
            avg_pace: None,
            avg_speed: None,
            max_speed: None,
            avg_cadence: None,
            max_cadence: None,
            power: PowerMetrics::default(),
            running_dynamics: RunningDynamics::default(),
            training_effect: TrainingEffect::default(),
            min_temperature: None,
            max_temperature: None,
            sweat_loss_ml: None,
            avg_stress: None,
            source_label: None,
            parent_id: None,
        }
    }

    /// Local calendar day the activity started on
    pub fn date(&self) -> NaiveDate {
        self.start_time.date()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance / 1000.0
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration / 3600.0
    }

    /// Whether this is a segment of a multisport activity
    pub fn is_segment(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Mean of min and max temperature, only when both were recorded
    pub fn avg_temperature(&self) -> Option<f64> {
        match (self.min_temperature, self.max_temperature) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }

    /// Lower-cased source label, falling back to the category name
    pub fn type_key(&self) -> String {
        self.source_label
            .as_deref()
            .map(|label| label.trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| self.category.as_str().to_string())
    }
}

/// Snapshot of an activity referenced from a result (record holder, longest effort, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub id: String,
    pub name: String,
    pub category: SportCategory,
    pub start_time: NaiveDateTime,
    pub distance_km: f64,
    pub duration_seconds: f64,
    pub elevation_gain: Option<f64>,
    pub calories: Option<f64>,
    pub avg_pace: Option<f64>,
    pub avg_speed: Option<f64>,
    pub max_heart_rate: Option<f64>,
}

impl From<&Activity> for ActivityRef {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.clone(),
            name: activity.name.clone(),
            category: activity.category,
            start_time: activity.start_time,
            distance_km: activity.distance_km(),
            duration_seconds: activity.duration,
            elevation_gain: activity.elevation_gain,
            calories: activity.calories,
            avg_pace: activity.avg_pace,
            avg_speed: activity.avg_speed,
            max_heart_rate: activity.max_heart_rate,
        }
    }
}

/// One calendar-day snapshot of auxiliary health metrics.
///
/// Samples are sparse: any field can be missing, and whole days can be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellnessSample {
    /// Calendar day the sample belongs to
    pub date: NaiveDate,

    /// Total steps
    #[serde(default)]
    pub steps: Option<u32>,

    /// Sleep score (0 - 100)
    #[serde(default)]
    pub sleep_score: Option<u8>,

    /// Time asleep in seconds
    #[serde(default)]
    pub sleep_seconds: Option<f64>,

    /// Overnight heart rate variability in milliseconds
    #[serde(default)]
    pub hrv: Option<f64>,

    /// Net body battery change over the day
    #[serde(default)]
    pub body_battery_change: Option<f64>,

    /// Estimated daily sweat loss in milliliters
    #[serde(default)]
    pub sweat_loss_ml: Option<f64>,

    /// Resting heart rate in bpm
    #[serde(default)]
    pub resting_heart_rate: Option<f64>,
}

impl WellnessSample {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            steps: None,
            sleep_score: None,
            sleep_seconds: None,
            hrv: None,
            body_battery_change: None,
            sweat_loss_ml: None,
            resting_heart_rate: None,
        }
    }
}

/// Profile values reported by the account settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Body weight in kilograms
    #[serde(default)]
    pub weight_kg: Option<f64>,

    #[serde(default)]
    pub vo2max_running: Option<f64>,

    #[serde(default)]
    pub vo2max_cycling: Option<f64>,
}

/// Everything the wellness source delivered for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellnessData {
    #[serde(default)]
    pub samples: Vec<WellnessSample>,

    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl WellnessData {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.profile.is_none()
    }
}

/// Direction of a metric between the first and second half of the year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    /// Classify a percentage change where higher is better
    pub fn from_change(change_pct: f64, threshold_pct: f64) -> Self {
        if change_pct > threshold_pct {
            Trend::Improving
        } else if change_pct < -threshold_pct {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Improving => write!(f, "improving"),
            Trend::Declining => write!(f, "declining"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

/// Round to the given number of decimals
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean, `None` for an empty input
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        None
    } else {
        Some(values.mean())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_sport_category_parsing() {
        assert_eq!("running".parse::<SportCategory>().unwrap(), SportCategory::Running);
        assert_eq!(" Yoga ".parse::<SportCategory>().unwrap(), SportCategory::Yoga);
        assert!("kitesurfing".parse::<SportCategory>().is_err());
    }

    #[test]
    fn test_sport_category_serialization() {
        let json = serde_json::to_string(&SportCategory::Strength).unwrap();
        assert_eq!(json, "\"strength\"");
        let parsed: SportCategory = serde_json::from_str("\"hiking\"").unwrap();
        assert_eq!(parsed, SportCategory::Hiking);
    }

    #[test]
    fn test_activity_new_clamps_negative_values() {
        let activity = Activity::new("a1", SportCategory::Running, "Run", start(), -5.0, -1.0);
        assert_eq!(activity.distance, 0.0);
        assert_eq!(activity.duration, 0.0);
        assert!(activity.calories.is_none());
        assert!(activity.running_dynamics.is_empty());
        assert!(activity.training_effect.is_empty());
    }

    #[test]
    fn test_activity_units() {
        let activity = Activity::new(
            "a1",
            SportCategory::Cycling,
            "Ride",
            start(),
            42_500.0,
            5400.0,
        );
        assert!((activity.distance_km() - 42.5).abs() < 1e-9);
        assert!((activity.duration_hours() - 1.5).abs() < 1e-9);
        assert_eq!(activity.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_avg_temperature_needs_both_bounds() {
        let mut activity = Activity::new("a1", SportCategory::Running, "Run", start(), 0.0, 0.0);
        activity.min_temperature = Some(2.0);
        assert!(activity.avg_temperature().is_none());
        activity.max_temperature = Some(6.0);
        assert_eq!(activity.avg_temperature(), Some(4.0));
    }

    #[test]
    fn test_type_key_falls_back_to_category() {
        let mut activity = Activity::new("a1", SportCategory::Cycling, "Ride", start(), 0.0, 0.0);
        assert_eq!(activity.type_key(), "cycling");
        activity.source_label = Some(" Road_Biking ".to_string());
        assert_eq!(activity.type_key(), "road_biking");
    }

    #[test]
    fn test_wellness_sample_from_sparse_json() {
        let json = r#"{"date": "2024-03-05", "steps": 12000}"#;
        let sample: WellnessSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.steps, Some(12000));
        assert!(sample.hrv.is_none());
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_trend_from_change() {
        assert_eq!(Trend::from_change(6.0, 5.0), Trend::Improving);
        assert_eq!(Trend::from_change(-6.0, 5.0), Trend::Declining);
        assert_eq!(Trend::from_change(5.0, 5.0), Trend::Stable);
    }

    #[test]
    fn test_mean_and_rounding() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean(vec![1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(round_to(3.14159, 1), 3.1);
        assert_eq!(round_to(2.675, 0), 3.0);
    }
}

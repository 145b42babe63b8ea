//! Sport label taxonomy
//!
//! Folds the open-ended set of sport labels found in activity sources (English and
//! German spreadsheet exports, account API type keys) into the closed set of
//! [`SportCategory`] values. The table is plain data: extending it means adding a
//! label, never adding a type.

use crate::models::{Activity, SportCategory};
use std::collections::{BTreeSet, HashMap};

/// Label lookup table plus the display sub-maps for cycling and other sports
#[derive(Debug, Clone)]
pub struct SportTaxonomy {
    categories: HashMap<String, SportCategory>,
    cycling_display: HashMap<String, &'static str>,
    other_display: HashMap<String, &'static str>,
}

impl SportTaxonomy {
    pub fn new() -> Self {
        let mut taxonomy = Self {
            categories: HashMap::new(),
            cycling_display: HashMap::new(),
            other_display: HashMap::new(),
        };

        taxonomy.add_labels(
            SportCategory::Running,
            &[
                "running",
                "laufen",
                "trail running",
                "trail-lauf",
                "treadmill running",
                "laufband",
                "laufbandtraining",
                "indoor running",
                "indoor-laufen",
                "track running",
                "bahnlauf",
                "virtual running",
                "virtuelles laufen",
                "ultra running",
                "obstacle run",
            ],
        );

        taxonomy.add_labels(
            SportCategory::Cycling,
            &[
                "cycling",
                "radfahren",
                "bike",
                "road cycling",
                "road biking",
                "rennrad",
                "mountain biking",
                "mountainbiken",
                "gravel cycling",
                "gravel-radfahren",
                "indoor cycling",
                "indoor-rad",
                "virtual ride",
                "virtuelles radfahren",
                "e-bike",
                "e bike",
                "e-bike cycling",
                "e-bike-fahren",
                "e bike mountain",
                "e bike fitness",
                "spinning",
                "spin",
                "commuting",
                "pendeln",
                "bmx",
                "cyclocross",
            ],
        );

        taxonomy.add_labels(
            SportCategory::Swimming,
            &[
                "swimming",
                "schwimmen",
                "pool swimming",
                "pool swim",
                "poolschwimmen",
                "open water swimming",
                "freiwasserschwimmen",
                "lap swimming",
                "bahnschwimmen",
            ],
        );

        taxonomy.add_labels(
            SportCategory::Walking,
            &["walking", "gehen", "casual walking", "speed walking"],
        );

        taxonomy.add_labels(
            SportCategory::Hiking,
            &["hiking", "wandern", "bergsteigen", "mountaineering"],
        );

        taxonomy.add_labels(
            SportCategory::Strength,
            &[
                "strength training",
                "krafttraining",
                "cardio",
                "indoor cardio",
                "hiit",
                "functional training",
                "funktionelles training",
                "crossfit",
                "bootcamp",
                "circuit training",
                "zirkeltraining",
                "elliptical",
                "crosstrainer",
                "stair stepper",
                "stepper",
                "floor climbing",
                "treppensteigen",
                "rowing",
                "rudern",
                "indoor rowing",
                "indoor-rudern",
                "pilates",
                "breathwork",
                "atemübungen",
                "bouldering",
                "bouldern",
                "indoor climbing",
                "indoor-klettern",
                "climbing",
                "klettern",
                "rock climbing",
            ],
        );

        taxonomy.add_labels(
            SportCategory::Yoga,
            &["yoga", "meditation", "stretching", "dehnen"],
        );

        taxonomy.add_labels(
            SportCategory::Other,
            &[
                "other",
                "multi sport",
                "transition",
                "volleyball",
                "beach volleyball",
                "beachvolleyball",
                "tennis",
                "badminton",
                "soccer",
                "fußball",
                "football",
                "basketball",
                "golf",
                "squash",
                "table tennis",
                "tischtennis",
                "kayaking",
                "stand up paddleboarding",
                "stand up paddleboarding v2",
                "surfing",
                "sailing",
                "skiing",
                "snowboarding",
                "cross country skiing",
                "backcountry skiing",
            ],
        );

        taxonomy.add_display(
            SportCategory::Cycling,
            "Road Bike",
            &["road biking", "road cycling", "rennrad"],
        );
        taxonomy.add_display(SportCategory::Cycling, "Cycling", &["cycling", "radfahren", "bike"]);
        taxonomy.add_display(
            SportCategory::Cycling,
            "Mountain Bike",
            &["mountain biking", "mountainbiken"],
        );
        taxonomy.add_display(
            SportCategory::Cycling,
            "Gravel",
            &["gravel cycling", "gravel-radfahren"],
        );
        taxonomy.add_display(SportCategory::Cycling, "Indoor", &["indoor cycling", "indoor-rad"]);
        taxonomy.add_display(
            SportCategory::Cycling,
            "Virtual",
            &["virtual ride", "virtuelles radfahren"],
        );
        taxonomy.add_display(
            SportCategory::Cycling,
            "E-Bike",
            &[
                "e-bike",
                "e bike",
                "e-bike cycling",
                "e-bike-fahren",
                "e bike mountain",
                "e bike fitness",
            ],
        );
        taxonomy.add_display(SportCategory::Cycling, "Spinning", &["spinning", "spin"]);
        taxonomy.add_display(SportCategory::Cycling, "Commute", &["commuting", "pendeln"]);
        taxonomy.add_display(SportCategory::Cycling, "BMX", &["bmx"]);
        taxonomy.add_display(SportCategory::Cycling, "Cyclocross", &["cyclocross"]);

        taxonomy.add_display(SportCategory::Other, "Multisport", &["multi sport"]);
        taxonomy.add_display(
            SportCategory::Other,
            "SUP",
            &["stand up paddleboarding", "stand up paddleboarding v2"],
        );
        taxonomy.add_display(SportCategory::Other, "Football", &["soccer", "fußball", "football"]);
        taxonomy.add_display(SportCategory::Other, "Volleyball", &["volleyball"]);
        taxonomy.add_display(
            SportCategory::Other,
            "Beach Volleyball",
            &["beach volleyball", "beachvolleyball"],
        );
        taxonomy.add_display(SportCategory::Other, "Tennis", &["tennis"]);
        taxonomy.add_display(SportCategory::Other, "Badminton", &["badminton"]);
        taxonomy.add_display(SportCategory::Other, "Basketball", &["basketball"]);
        taxonomy.add_display(SportCategory::Other, "Golf", &["golf"]);
        taxonomy.add_display(SportCategory::Other, "Squash", &["squash"]);
        taxonomy.add_display(
            SportCategory::Other,
            "Table Tennis",
            &["table tennis", "tischtennis"],
        );
        taxonomy.add_display(SportCategory::Other, "Kayak", &["kayaking"]);
        taxonomy.add_display(SportCategory::Other, "Surfing", &["surfing"]);
        taxonomy.add_display(SportCategory::Other, "Sailing", &["sailing"]);
        taxonomy.add_display(SportCategory::Other, "Skiing", &["skiing"]);
        taxonomy.add_display(SportCategory::Other, "Snowboard", &["snowboarding"]);
        taxonomy.add_display(
            SportCategory::Other,
            "Cross-Country Skiing",
            &["cross country skiing"],
        );
        taxonomy.add_display(SportCategory::Other, "Ski Touring", &["backcountry skiing"]);
        taxonomy.add_display(SportCategory::Other, "Transition", &["transition"]);

        taxonomy
    }

    fn add_labels(&mut self, category: SportCategory, labels: &[&str]) {
        for label in labels {
            self.categories.insert(normalize_label(label), category);
        }
    }

    fn add_display(&mut self, category: SportCategory, display: &'static str, labels: &[&str]) {
        let map = match category {
            SportCategory::Cycling => &mut self.cycling_display,
            _ => &mut self.other_display,
        };
        for label in labels {
            map.insert(normalize_label(label), display);
        }
    }

    /// Category for a known label, `None` for anything not in the table
    pub fn lookup(&self, label: &str) -> Option<SportCategory> {
        self.categories.get(&normalize_label(label)).copied()
    }

    /// Classify a label, degrading unknown labels to [`SportCategory::Other`].
    ///
    /// Unknown non-empty labels are added to `unknown` exactly as trimmed from the source.
    pub fn classify(&self, label: &str, unknown: &mut BTreeSet<String>) -> SportCategory {
        match self.lookup(label) {
            Some(category) => category,
            None => {
                let trimmed = label.trim();
                if !trimmed.is_empty() && unknown.insert(trimmed.to_string()) {
                    tracing::debug!(label = trimmed, "Unknown activity type mapped to other");
                }
                SportCategory::Other
            }
        }
    }

    /// Human label for the cycling and other sub-breakdowns.
    ///
    /// Returns `None` for categories without a sub-breakdown. Labels missing from the
    /// display table are shown as the source wrote them.
    pub fn display_name(&self, category: SportCategory, label: &str) -> Option<String> {
        let map = match category {
            SportCategory::Cycling => &self.cycling_display,
            SportCategory::Other => &self.other_display,
            _ => return None,
        };

        let trimmed = label.trim();
        let display = map
            .get(&normalize_label(trimmed))
            .map(|display| display.to_string())
            .unwrap_or_else(|| {
                if trimmed.is_empty() {
                    match category {
                        SportCategory::Cycling => "Cycling".to_string(),
                        _ => "Other".to_string(),
                    }
                } else {
                    trimmed.to_string()
                }
            });
        Some(display)
    }

    /// Labels of `activities` that the table does not know, sorted
    pub fn unknown_labels(&self, activities: &[Activity]) -> Vec<String> {
        let mut unknown = BTreeSet::new();
        for activity in activities {
            if let Some(label) = &activity.source_label {
                if self.lookup(label).is_none() && !label.trim().is_empty() {
                    unknown.insert(label.trim().to_string());
                }
            }
        }
        unknown.into_iter().collect()
    }
}

impl Default for SportTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-case, trim, and treat `_` like a space so API type keys and spreadsheet
/// labels share one key space
fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase().replace('_', " ")
}

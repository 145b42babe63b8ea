use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ImportError, Result};
use crate::models::{UserProfile, WellnessData, WellnessSample};

/// Load a wellness export.
///
/// Accepts either a bare JSON array of day samples or an object with `samples` and an
/// optional `profile`. Samples that fail to decode are skipped with a warning.
pub fn import_wellness_file(path: &Path) -> Result<WellnessData> {
    if !path.exists() {
        return Err(ImportError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path)?;
    let data = import_wellness_str(&content)?;
    tracing::info!(
        file = %path.display(),
        samples = data.samples.len(),
        has_profile = data.profile.is_some(),
        "Loaded wellness data"
    );
    Ok(data)
}

/// Decode a wellness export held in memory
pub fn import_wellness_str(content: &str) -> Result<WellnessData> {
    let value: Value = serde_json::from_str(content).map_err(|e| ImportError::ParseError {
        format: "JSON".to_string(),
        reason: e.to_string(),
    })?;

    let (samples, profile) = match value {
        Value::Array(samples) => (samples, None),
        Value::Object(mut object) => {
            let samples = match object.remove("samples") {
                Some(Value::Array(samples)) => samples,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => {
                    return Err(ImportError::InvalidStructure {
                        reason: "`samples` must be an array".to_string(),
                    }
                    .into())
                }
            };
            let profile = match object.remove("profile") {
                Some(Value::Null) | None => None,
                Some(profile) => Some(serde_json::from_value::<UserProfile>(profile).map_err(
                    |e| ImportError::InvalidStructure {
                        reason: format!("invalid profile: {}", e),
                    },
                )?),
            };
            (samples, profile)
        }
        _ => {
            return Err(ImportError::InvalidStructure {
                reason: "expected an array of samples or an object with `samples`".to_string(),
            }
            .into())
        }
    };

    let mut data = WellnessData {
        samples: Vec::with_capacity(samples.len()),
        profile,
    };

    for (index, sample) in samples.into_iter().enumerate() {
        match serde_json::from_value::<WellnessSample>(sample) {
            Ok(sample) => data.samples.push(sample),
            Err(e) => tracing::warn!(index, error = %e, "Skipping malformed wellness sample"),
        }
    }

    log_duplicate_days(&data.samples);
    Ok(data)
}

/// Same-day samples are all kept; report how many days repeat
fn log_duplicate_days(samples: &[WellnessSample]) {
    let mut per_day: HashMap<_, usize> = HashMap::new();
    for sample in samples {
        *per_day.entry(sample.date).or_default() += 1;
    }
    let duplicated = per_day.values().filter(|count| **count > 1).count();
    if duplicated > 0 {
        tracing::debug!(days = duplicated, "Wellness data contains repeated days");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WrappedError;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_bare_array() {
        let content = r#"[
            {"date": "2024-01-01", "steps": 8000, "sleepScore": 82, "hrv": 45.0},
            {"date": "2024-01-02", "restingHeartRate": 52.0}
        ]"#;
        let data = import_wellness_str(content).unwrap();
        assert_eq!(data.samples.len(), 2);
        assert!(data.profile.is_none());
        assert_eq!(data.samples[0].steps, Some(8000));
        assert_eq!(data.samples[0].sleep_score, Some(82));
        assert_eq!(data.samples[1].resting_heart_rate, Some(52.0));
        assert!(data.samples[1].steps.is_none());
    }

    #[test]
    fn test_object_with_profile_and_duplicates() {
        let content = r#"{
            "samples": [
                {"date": "2024-03-01", "steps": 1000},
                {"date": "2024-03-01", "steps": 2000},
                {"date": "not a date"}
            ],
            "profile": {"weightKg": 71.5, "vo2maxRunning": 52.0}
        }"#;
        let data = import_wellness_str(content).unwrap();
        assert_eq!(data.samples.len(), 2);
        assert_eq!(data.samples[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(data.samples[1].steps, Some(2000));

        let profile = data.profile.unwrap();
        assert_eq!(profile.weight_kg, Some(71.5));
        assert_eq!(profile.vo2max_running, Some(52.0));
        assert!(profile.vo2max_cycling.is_none());
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(
            import_wellness_str("42"),
            Err(WrappedError::Import(ImportError::InvalidStructure { .. }))
        ));
        assert!(matches!(
            import_wellness_str(r#"{"samples": {}}"#),
            Err(WrappedError::Import(ImportError::InvalidStructure { .. }))
        ));
        assert!(matches!(
            import_wellness_str("{"),
            Err(WrappedError::Import(ImportError::ParseError { .. }))
        ));
    }

    #[test]
    fn test_import_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wellness.json");
        std::fs::write(&path, r#"[{"date": "2024-05-05", "sleepSeconds": 27000}]"#).unwrap();

        let data = import_wellness_file(&path).unwrap();
        assert_eq!(data.samples[0].sleep_seconds, Some(27000.0));

        assert!(import_wellness_file(&dir.path().join("missing.json")).is_err());
    }
}

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{ImportError, Result, RowError};
use crate::import::parsing::parse_datetime;
use crate::import::{has_extension, ActivityBatch, ImportFormat};
use crate::models::{Activity, SportCategory};
use crate::taxonomy::SportTaxonomy;

/// One activity record of a JSON activity dump.
///
/// Units follow the service: meters, seconds, meters per second.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiActivity {
    #[serde(default)]
    activity_id: Option<Value>,
    #[serde(default)]
    activity_name: Option<String>,
    #[serde(default)]
    start_time_local: Option<String>,
    #[serde(default)]
    activity_type: Option<ApiActivityType>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    elevation_gain: Option<f64>,
    #[serde(default)]
    elevation_loss: Option<f64>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default, rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(default, rename = "maxHR")]
    max_hr: Option<f64>,
    #[serde(default)]
    average_speed: Option<f64>,
    #[serde(default)]
    max_speed: Option<f64>,
    #[serde(default)]
    avg_power: Option<f64>,
    #[serde(default)]
    max_power: Option<f64>,
    #[serde(default)]
    norm_power: Option<f64>,
    #[serde(default, rename = "max20MinPower")]
    max_20_min_power: Option<f64>,
    #[serde(default)]
    training_stress_score: Option<f64>,
    #[serde(default)]
    intensity_factor: Option<f64>,
    #[serde(default)]
    left_balance: Option<f64>,
    #[serde(default)]
    right_balance: Option<f64>,
    #[serde(default)]
    avg_ground_contact_time: Option<f64>,
    #[serde(default)]
    avg_vertical_oscillation: Option<f64>,
    #[serde(default)]
    avg_stride_length: Option<f64>,
    #[serde(default)]
    average_running_cadence_in_steps_per_minute: Option<f64>,
    #[serde(default)]
    max_running_cadence_in_steps_per_minute: Option<f64>,
    #[serde(default)]
    average_biking_cadence_in_rev_per_minute: Option<f64>,
    #[serde(default)]
    max_biking_cadence_in_rev_per_minute: Option<f64>,
    #[serde(default)]
    avg_vertical_ratio: Option<f64>,
    #[serde(default)]
    avg_ground_contact_balance: Option<f64>,
    #[serde(default)]
    aerobic_training_effect: Option<f64>,
    #[serde(default)]
    anaerobic_training_effect: Option<f64>,
    #[serde(default)]
    training_effect_label: Option<String>,
    #[serde(default)]
    min_temperature: Option<f64>,
    #[serde(default)]
    max_temperature: Option<f64>,
    #[serde(default)]
    water_estimated: Option<f64>,
    #[serde(default)]
    avg_stress: Option<f64>,
    #[serde(default)]
    child_activities: Vec<ApiActivity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiActivityType {
    #[serde(default)]
    type_key: Option<String>,
}

/// The service reports absent metrics as zero
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn activity_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

/// Importer for JSON arrays of activity records as returned by the activity service API
pub struct GarminApiImporter {
    taxonomy: SportTaxonomy,
}

impl GarminApiImporter {
    pub fn new() -> Self {
        Self::with_taxonomy(SportTaxonomy::new())
    }

    pub fn with_taxonomy(taxonomy: SportTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// Import a dump held in memory. `source` names it in row errors.
    pub fn import_str(&self, content: &str, source: &str) -> Result<ActivityBatch> {
        let value: Value = serde_json::from_str(content).map_err(|e| ImportError::ParseError {
            format: "JSON".to_string(),
            reason: e.to_string(),
        })?;
        self.import_value(value, source)
    }

    /// Import an already decoded dump; the top level must be an array
    pub fn import_value(&self, value: Value, source: &str) -> Result<ActivityBatch> {
        let Value::Array(records) = value else {
            return Err(ImportError::InvalidStructure {
                reason: "expected a top-level array of activities".to_string(),
            }
            .into());
        };

        let mut batch = ActivityBatch::default();

        for (row, record) in records.into_iter().enumerate() {
            let api = match serde_json::from_value::<ApiActivity>(record) {
                Ok(api) => api,
                Err(e) => {
                    tracing::warn!(source, row, error = %e, "Skipping malformed activity record");
                    batch.errors.push(RowError::new(row, source, e.to_string()));
                    continue;
                }
            };

            match self.convert(&api, None, &mut batch.unknown_labels) {
                Ok(activity) => {
                    let parent_id = activity.id.clone();
                    let parent_start = activity.start_time;
                    batch.activities.push(activity);

                    for child in &api.child_activities {
                        let context = Some((parent_id.as_str(), parent_start));
                        match self.convert(child, context, &mut batch.unknown_labels) {
                            Ok(segment) => batch.activities.push(segment),
                            Err(reason) => {
                                tracing::warn!(
                                    source,
                                    row,
                                    reason = %reason,
                                    "Skipping multisport segment"
                                );
                                batch.errors.push(RowError::new(row, source, reason));
                            }
                        }
                    }
                }
                Err(reason) => {
                    tracing::warn!(source, row, reason = %reason, "Skipping activity record");
                    batch.errors.push(RowError::new(row, source, reason));
                }
            }
        }

        Ok(batch)
    }

    /// Convert one record; `parent` is set for segments of a multisport activity
    fn convert(
        &self,
        api: &ApiActivity,
        parent: Option<(&str, chrono::NaiveDateTime)>,
        unknown: &mut BTreeSet<String>,
    ) -> std::result::Result<Activity, String> {
        let start_time = match api.start_time_local.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                parse_datetime(text).ok_or_else(|| format!("unparseable start time '{}'", text))?
            }
            _ => match parent {
                Some((_, parent_start)) => parent_start,
                None => return Err("missing start time".to_string()),
            },
        };

        let type_key = api
            .activity_type
            .as_ref()
            .and_then(|t| t.type_key.as_deref())
            .unwrap_or("")
            .trim()
            .to_string();
        let category = self.taxonomy.classify(&type_key, unknown);

        let name = api
            .activity_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&type_key)
            .to_string();

        let mut activity = Activity::new(
            activity_id(api.activity_id.as_ref()),
            category,
            name,
            start_time,
            api.distance.unwrap_or(0.0),
            api.duration.unwrap_or(0.0),
        );

        activity.calories = positive(api.calories);
        activity.elevation_gain = api.elevation_gain.filter(|v| *v >= 0.0);
        activity.elevation_loss = api.elevation_loss.filter(|v| *v >= 0.0);
        activity.avg_heart_rate = positive(api.average_hr);
        activity.max_heart_rate = positive(api.max_hr);

        if let Some(speed) = positive(api.average_speed) {
            activity.avg_speed = Some(speed * 3.6);
            if category.uses_pace() {
                activity.avg_pace = Some(1000.0 / speed / 60.0);
            }
        }
        activity.max_speed = positive(api.max_speed).map(|speed| speed * 3.6);

        if category == SportCategory::Cycling {
            activity.avg_cadence = positive(api.average_biking_cadence_in_rev_per_minute);
            activity.max_cadence = positive(api.max_biking_cadence_in_rev_per_minute);
        } else {
            activity.avg_cadence = positive(api.average_running_cadence_in_steps_per_minute);
            activity.max_cadence = positive(api.max_running_cadence_in_steps_per_minute);
        }

        activity.power.avg_power = positive(api.avg_power);
        activity.power.max_power = positive(api.max_power);
        activity.power.normalized_power = positive(api.norm_power);
        activity.power.max_20min_power = positive(api.max_20_min_power);
        activity.power.training_stress_score = positive(api.training_stress_score);
        activity.power.intensity_factor = positive(api.intensity_factor);
        activity.power.left_balance = positive(api.left_balance);
        activity.power.right_balance = positive(api.right_balance);

        activity.running_dynamics.ground_contact_time = positive(api.avg_ground_contact_time);
        activity.running_dynamics.vertical_oscillation = positive(api.avg_vertical_oscillation);
        // Stride length is reported in centimeters
        activity.running_dynamics.stride_length =
            positive(api.avg_stride_length).map(|cm| cm / 100.0);
        activity.running_dynamics.cadence =
            positive(api.average_running_cadence_in_steps_per_minute);
        activity.running_dynamics.vertical_ratio = positive(api.avg_vertical_ratio);
        activity.running_dynamics.ground_contact_balance = positive(api.avg_ground_contact_balance);

        activity.training_effect.aerobic = positive(api.aerobic_training_effect);
        activity.training_effect.anaerobic = positive(api.anaerobic_training_effect);
        activity.training_effect.label = api
            .training_effect_label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string);

        // Temperatures can legitimately be zero or below
        activity.min_temperature = api.min_temperature.filter(|t| t.is_finite());
        activity.max_temperature = api.max_temperature.filter(|t| t.is_finite());
        activity.sweat_loss_ml = positive(api.water_estimated);
        activity.avg_stress = positive(api.avg_stress);

        activity.source_label = Some(type_key).filter(|key| !key.is_empty());
        activity.parent_id = parent.map(|(id, _)| id.to_string());

        Ok(activity)
    }
}

impl Default for GarminApiImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for GarminApiImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<ActivityBatch> {
        let content = std::fs::read_to_string(file_path)?;
        let source = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.import_str(&content, &source)
    }

    fn get_format_name(&self) -> &'static str {
        "Activity JSON"
    }
}

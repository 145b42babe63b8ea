use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{ImportError, Result, RowError};
use crate::import::parsing::{
    self, is_missing, parse_distance_meters, parse_duration, parse_number, parse_pace,
    NumberFormat,
};
use crate::import::{has_extension, ActivityBatch, ImportFormat};
use crate::models::Activity;
use crate::taxonomy::SportTaxonomy;

/// Canonical columns of an activity list export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    ActivityType,
    Date,
    Title,
    Distance,
    Time,
    Calories,
    AvgHeartRate,
    MaxHeartRate,
    AvgPace,
    AvgSpeed,
    MaxSpeed,
    ElevationGain,
    ElevationLoss,
    AvgCadence,
    MaxCadence,
    AvgPower,
    MaxPower,
    NormalizedPower,
    TrainingStressScore,
    AerobicTrainingEffect,
    AvgGroundContactTime,
    AvgVerticalOscillation,
    AvgStrideLength,
    AvgVerticalRatio,
    MinTemperature,
    MaxTemperature,
}

/// Header language of an export; decides the number format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Vocabulary {
    English,
    German,
}

impl Vocabulary {
    fn number_format(&self) -> NumberFormat {
        match self {
            Vocabulary::English => NumberFormat::Point,
            Vocabulary::German => NumberFormat::Comma,
        }
    }
}

/// Importer for activity list exports with English or German headers
pub struct CsvImporter {
    column_mapping: HashMap<String, (Column, Option<Vocabulary>)>,
    taxonomy: SportTaxonomy,
}

impl CsvImporter {
    pub fn new() -> Self {
        Self::with_taxonomy(SportTaxonomy::new())
    }

    pub fn with_taxonomy(taxonomy: SportTaxonomy) -> Self {
        let mut column_mapping = HashMap::new();

        use Column::*;
        use Vocabulary::*;

        Self::add_mapping(&mut column_mapping, ActivityType, English, &["activity type"]);
        Self::add_mapping(&mut column_mapping, ActivityType, German, &["aktivitätstyp"]);
        Self::add_mapping(&mut column_mapping, Date, English, &["date"]);
        Self::add_mapping(&mut column_mapping, Date, German, &["datum"]);
        Self::add_mapping(&mut column_mapping, Title, English, &["title"]);
        Self::add_mapping(&mut column_mapping, Title, German, &["titel"]);
        Self::add_mapping(&mut column_mapping, Distance, English, &["distance"]);
        Self::add_mapping(&mut column_mapping, Distance, German, &["distanz"]);
        Self::add_mapping(&mut column_mapping, Time, English, &["time"]);
        Self::add_mapping(&mut column_mapping, Time, German, &["zeit"]);
        Self::add_mapping(&mut column_mapping, Calories, English, &["calories"]);
        Self::add_mapping(&mut column_mapping, Calories, German, &["kalorien"]);
        Self::add_mapping(&mut column_mapping, AvgHeartRate, English, &["avg hr"]);
        Self::add_mapping(&mut column_mapping, AvgHeartRate, German, &["durchschn. hf", "ø hf"]);
        Self::add_mapping(&mut column_mapping, MaxHeartRate, English, &["max hr"]);
        Self::add_mapping(&mut column_mapping, MaxHeartRate, German, &["max. hf"]);
        Self::add_mapping(&mut column_mapping, AvgPace, English, &["avg pace"]);
        Self::add_mapping(&mut column_mapping, AvgPace, German, &["durchschn. pace", "ø pace"]);
        Self::add_mapping(&mut column_mapping, AvgSpeed, English, &["avg speed"]);
        Self::add_mapping(
            &mut column_mapping,
            AvgSpeed,
            German,
            &["durchschn. geschwindigkeit", "ø geschwindigkeit"],
        );
        Self::add_mapping(&mut column_mapping, MaxSpeed, English, &["max speed"]);
        Self::add_mapping(&mut column_mapping, MaxSpeed, German, &["max. geschwindigkeit"]);
        Self::add_mapping(
            &mut column_mapping,
            ElevationGain,
            English,
            &["elev gain", "total ascent"],
        );
        Self::add_mapping(
            &mut column_mapping,
            ElevationGain,
            German,
            &["höhengewinn", "positiver höhenunterschied", "anstieg gesamt"],
        );
        Self::add_mapping(
            &mut column_mapping,
            ElevationLoss,
            English,
            &["elev loss", "total descent"],
        );
        Self::add_mapping(
            &mut column_mapping,
            ElevationLoss,
            German,
            &["höhenverlust", "negativer höhenunterschied", "abstieg gesamt"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AvgCadence,
            English,
            &["avg cadence", "avg run cadence", "avg bike cadence"],
        );
        Self::add_mapping(&mut column_mapping, AvgCadence, German, &["durchschn. schrittfrequenz"]);
        Self::add_mapping(
            &mut column_mapping,
            MaxCadence,
            English,
            &["max cadence", "max run cadence", "max bike cadence"],
        );
        Self::add_mapping(&mut column_mapping, MaxCadence, German, &["max. schrittfrequenz"]);
        Self::add_mapping(&mut column_mapping, AvgPower, English, &["avg power"]);
        Self::add_mapping(&mut column_mapping, AvgPower, German, &["durchschn. leistung"]);
        Self::add_mapping(&mut column_mapping, MaxPower, English, &["max power"]);
        Self::add_mapping(&mut column_mapping, MaxPower, German, &["max. leistung"]);
        // Trademarked names appear untranslated in both languages
        Self::add_neutral(&mut column_mapping, NormalizedPower, &["normalized power® (np®)"]);
        Self::add_mapping(&mut column_mapping, NormalizedPower, English, &["normalized power"]);
        Self::add_neutral(&mut column_mapping, TrainingStressScore, &["training stress score®"]);
        Self::add_mapping(
            &mut column_mapping,
            TrainingStressScore,
            English,
            &["training stress score"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AerobicTrainingEffect,
            English,
            &["training effect", "aerobic te"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AerobicTrainingEffect,
            German,
            &["trainingseffekt", "aerober te"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AvgGroundContactTime,
            English,
            &["avg ground contact time"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AvgGroundContactTime,
            German,
            &["durchschn. bodenkontaktzeit"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AvgVerticalOscillation,
            English,
            &["avg vertical oscillation"],
        );
        Self::add_mapping(
            &mut column_mapping,
            AvgVerticalOscillation,
            German,
            &["durchschn. vertikale bewegung"],
        );
        Self::add_mapping(&mut column_mapping, AvgStrideLength, English, &["avg stride length"]);
        Self::add_mapping(
            &mut column_mapping,
            AvgStrideLength,
            German,
            &["durchschn. schrittlänge"],
        );
        Self::add_mapping(&mut column_mapping, AvgVerticalRatio, English, &["avg vertical ratio"]);
        Self::add_mapping(
            &mut column_mapping,
            AvgVerticalRatio,
            German,
            &["durchschn. vertikales verhältnis"],
        );
        Self::add_mapping(&mut column_mapping, MinTemperature, English, &["min temp"]);
        Self::add_mapping(&mut column_mapping, MinTemperature, German, &["min. temp."]);
        Self::add_mapping(&mut column_mapping, MaxTemperature, English, &["max temp"]);
        Self::add_mapping(&mut column_mapping, MaxTemperature, German, &["max. temp."]);

        Self {
            column_mapping,
            taxonomy,
        }
    }

    fn add_mapping(
        mapping: &mut HashMap<String, (Column, Option<Vocabulary>)>,
        standard: Column,
        vocabulary: Vocabulary,
        variations: &[&str],
    ) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), (standard, Some(vocabulary)));
        }
    }

    /// Headers shared by every language; they never vote on the number format
    fn add_neutral(
        mapping: &mut HashMap<String, (Column, Option<Vocabulary>)>,
        standard: Column,
        variations: &[&str],
    ) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), (standard, None));
        }
    }

    fn normalize_column_name(name: &str) -> String {
        name.trim_start_matches('\u{feff}').trim().to_lowercase()
    }

    /// Import an export already held in memory. `source` names it in row errors.
    pub fn import_str(&self, content: &str, source: &str) -> Result<ActivityBatch> {
        let delimiter = detect_delimiter(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ImportError::ParseError {
                format: "CSV".to_string(),
                reason: e.to_string(),
            })?
            .clone();

        let layout = self.resolve_layout(&headers)?;
        tracing::debug!(
            source,
            number_format = ?layout.number_format,
            columns = layout.columns.len(),
            "Resolved CSV header layout"
        );

        let mut batch = ActivityBatch::default();

        for (row, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(source, row, error = %e, "Unreadable CSV row");
                    batch.errors.push(RowError::new(row, source, e.to_string()));
                    continue;
                }
            };

            match self.parse_row(&layout, &record, &mut batch.unknown_labels) {
                Ok(Some(activity)) => batch.activities.push(activity),
                Ok(None) => {
                    tracing::debug!(source, row, "Skipping row without date and activity type");
                }
                Err(reason) => {
                    tracing::warn!(source, row, reason = %reason, "Skipping CSV row");
                    batch.errors.push(RowError::new(row, source, reason));
                }
            }
        }

        Ok(batch)
    }

    fn resolve_layout(&self, headers: &StringRecord) -> Result<HeaderLayout> {
        let mut columns = HashMap::new();
        let mut vocabularies = BTreeSet::new();

        for (index, header) in headers.iter().enumerate() {
            if let Some((column, vocabulary)) =
                self.column_mapping.get(&Self::normalize_column_name(header))
            {
                // First occurrence wins when a header is repeated
                columns.entry(*column).or_insert(index);
                if let Some(vocabulary) = vocabulary {
                    vocabularies.insert(*vocabulary);
                }
            }
        }

        if !columns.contains_key(&Column::Date) {
            return Err(ImportError::MissingColumn {
                column: "Date".to_string(),
            }
            .into());
        }
        if !columns.contains_key(&Column::ActivityType) {
            return Err(ImportError::MissingColumn {
                column: "Activity Type".to_string(),
            }
            .into());
        }

        let number_format = match vocabularies.iter().collect::<Vec<_>>().as_slice() {
            [only] => only.number_format(),
            _ => NumberFormat::Auto,
        };

        Ok(HeaderLayout {
            columns,
            number_format,
        })
    }

    /// `Ok(None)` for a row with neither date nor type, `Err` for a row that cannot be used
    fn parse_row(
        &self,
        layout: &HeaderLayout,
        record: &StringRecord,
        unknown: &mut BTreeSet<String>,
    ) -> std::result::Result<Option<Activity>, String> {
        let date_cell = layout.cell(record, Column::Date);
        let type_cell = layout.cell(record, Column::ActivityType);

        if is_missing(date_cell) && is_missing(type_cell) {
            return Ok(None);
        }
        if is_missing(date_cell) {
            return Err("missing date".to_string());
        }

        let start_time = parsing::parse_datetime(date_cell)
            .ok_or_else(|| format!("unparseable date '{}'", date_cell.trim()))?;

        let label = if is_missing(type_cell) { "" } else { type_cell.trim() };
        let category = self.taxonomy.classify(label, unknown);

        let title = layout.cell(record, Column::Title).trim();
        let name = if title.is_empty() { label } else { title };

        let format = layout.number_format;
        let number = |column: Column| parse_number(layout.cell(record, column), format);
        let positive = |column: Column| number(column).filter(|value| *value > 0.0);

        let mut activity = Activity::new(
            uuid::Uuid::new_v4().to_string(),
            category,
            name,
            start_time,
            parse_distance_meters(layout.cell(record, Column::Distance), format),
            parse_duration(layout.cell(record, Column::Time)).unwrap_or(0.0),
        );

        activity.calories = positive(Column::Calories);
        activity.elevation_gain = number(Column::ElevationGain).filter(|v| *v >= 0.0);
        activity.elevation_loss = number(Column::ElevationLoss).filter(|v| *v >= 0.0);
        activity.avg_heart_rate = positive(Column::AvgHeartRate);
        activity.max_heart_rate = positive(Column::MaxHeartRate);

        // Foot sports often carry a pace in the speed columns
        let speed_cell = layout.cell(record, Column::AvgSpeed);
        activity.avg_pace = parse_pace(layout.cell(record, Column::AvgPace))
            .or_else(|| speed_cell.contains(':').then(|| parse_pace(speed_cell)).flatten());
        if !speed_cell.contains(':') {
            activity.avg_speed = positive(Column::AvgSpeed);
        }
        if !layout.cell(record, Column::MaxSpeed).contains(':') {
            activity.max_speed = positive(Column::MaxSpeed);
        }

        activity.avg_cadence = positive(Column::AvgCadence);
        activity.max_cadence = positive(Column::MaxCadence);
        activity.power.avg_power = positive(Column::AvgPower);
        activity.power.max_power = positive(Column::MaxPower);
        activity.power.normalized_power = positive(Column::NormalizedPower);
        activity.power.training_stress_score = positive(Column::TrainingStressScore);
        activity.training_effect.aerobic = positive(Column::AerobicTrainingEffect);
        activity.running_dynamics.ground_contact_time = positive(Column::AvgGroundContactTime);
        activity.running_dynamics.vertical_oscillation = positive(Column::AvgVerticalOscillation);
        activity.running_dynamics.stride_length = positive(Column::AvgStrideLength);
        activity.running_dynamics.vertical_ratio = positive(Column::AvgVerticalRatio);
        if activity.category.uses_pace() {
            activity.running_dynamics.cadence = activity.avg_cadence;
        }
        activity.min_temperature = number(Column::MinTemperature);
        activity.max_temperature = number(Column::MaxTemperature);
        activity.source_label = Some(label.to_string()).filter(|label| !label.is_empty());

        Ok(Some(activity))
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<ActivityBatch> {
        let bytes = std::fs::read(file_path)?;
        let content = String::from_utf8_lossy(&bytes);
        let source = file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.import_str(&content, &source)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}

/// Column positions resolved from the header row
struct HeaderLayout {
    columns: HashMap<Column, usize>,
    number_format: NumberFormat,
}

impl HeaderLayout {
    fn cell<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        self.columns
            .get(&column)
            .and_then(|index| record.get(*index))
            .unwrap_or("")
    }
}

/// Semicolon-separated exports come from spreadsheet tools in comma-decimal locales
fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SportCategory;
    use chrono::{NaiveDate, Timelike};

    const ENGLISH: &str = "\
Activity Type,Date,Title,Distance,Calories,Time,Avg HR,Max HR,Avg Pace,Avg Speed,Elev Gain,Avg Power
Running,2024-03-01 07:00:00,Morning Run,5.02,\"1,234\",00:25:10,152,171,5:01,--,45,--
Cycling,2024-03-02 10:30:00,Long Ride,82.40,2100,3:05:00,135,168,--,26.7,950,210
Kitesurfing,2024-03-03 15:00:00,Kite,0.00,--,1:30:00,--,--,--,--,--,--
";

    const GERMAN: &str = "\
Aktivitätstyp,Datum,Titel,Distanz,Kalorien,Zeit,Durchschn. HF,Max. HF,Durchschn. Pace,Höhengewinn
Laufen,5.1.2024 07:15,Lauf am Morgen,\"10,03\",\"1.050\",52:30,148,175,5:14,--
Rennrad,6.1.2024,Ausfahrt,\"45,5\",900,1:40:00,130,160,--,\"1.200\"
";

    #[test]
    fn test_english_export() {
        let batch = CsvImporter::new().import_str(ENGLISH, "english.csv").unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.errors.is_empty());

        let run = &batch.activities[0];
        assert_eq!(run.category, SportCategory::Running);
        assert_eq!(run.name, "Morning Run");
        assert!((run.distance - 5020.0).abs() < 1e-6);
        assert_eq!(run.duration, 1510.0);
        assert_eq!(run.calories, Some(1234.0));
        assert_eq!(run.max_heart_rate, Some(171.0));
        assert!((run.avg_pace.unwrap() - (5.0 + 1.0 / 60.0)).abs() < 1e-9);
        assert!(run.avg_speed.is_none());
        assert!(run.power.avg_power.is_none());

        let ride = &batch.activities[1];
        assert_eq!(ride.category, SportCategory::Cycling);
        assert_eq!(ride.avg_speed, Some(26.7));
        assert_eq!(ride.power.avg_power, Some(210.0));
        assert_eq!(ride.elevation_gain, Some(950.0));
    }

    #[test]
    fn test_unknown_label_is_tracked() {
        let batch = CsvImporter::new().import_str(ENGLISH, "english.csv").unwrap();
        let kite = &batch.activities[2];
        assert_eq!(kite.category, SportCategory::Other);
        assert_eq!(kite.source_label.as_deref(), Some("Kitesurfing"));
        assert!(kite.calories.is_none());
        assert!(batch.unknown_labels.contains("Kitesurfing"));
    }

    #[test]
    fn test_german_export() {
        let batch = CsvImporter::new().import_str(GERMAN, "deutsch.csv").unwrap();
        assert_eq!(batch.len(), 2);

        let run = &batch.activities[0];
        assert_eq!(run.category, SportCategory::Running);
        assert!((run.distance - 10_030.0).abs() < 1e-6);
        assert_eq!(run.duration, 3150.0);
        assert_eq!(run.calories, Some(1050.0));
        assert_eq!(run.start_time.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(run.start_time.hour(), 7);
        assert!(run.elevation_gain.is_none());

        let ride = &batch.activities[1];
        assert_eq!(ride.category, SportCategory::Cycling);
        assert_eq!(ride.start_time.hour(), 12);
        assert_eq!(ride.elevation_gain, Some(1200.0));
    }

    #[test]
    fn test_bad_rows_do_not_abort_the_batch() {
        let content = "\
Activity Type,Date,Title,Distance,Time
Running,2024-04-01 07:00:00,Good,5.0,25:00
Running,sometime,Bad date,5.0,25:00
,,,,
Running,,No date,5.0,25:00
Walking,2024-04-02 18:00:00,Walk,3.1,40:00
";
        let batch = CsvImporter::new().import_str(content, "mixed.csv").unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.errors.len(), 2);
        assert_eq!(batch.errors[0].row, 1);
        assert!(batch.errors[0].reason.contains("sometime"));
        assert_eq!(batch.errors[1].reason, "missing date");
    }

    #[test]
    fn test_semicolon_delimited_export() {
        let content = "Aktivitätstyp;Datum;Distanz;Zeit\nLaufen;2024-05-01 08:00:00;7,5;40:00\n";
        let batch = CsvImporter::new().import_str(content, "semi.csv").unwrap();
        assert_eq!(batch.len(), 1);
        assert!((batch.activities[0].distance - 7500.0).abs() < 1e-6);
    }

    #[test]
    fn test_trademark_headers_keep_german_number_format() {
        let content = "\
Aktivitätstyp,Datum,Distanz,Kalorien,Zeit,Höhengewinn,Training Stress Score®,Normalized Power® (NP®)
Rennrad,6.1.2024 09:00,\"45,5\",\"1.050\",1:40:00,\"1.200\",\"85,3\",210
";
        let batch = CsvImporter::new().import_str(content, "deutsch.csv").unwrap();
        assert_eq!(batch.len(), 1);

        let ride = &batch.activities[0];
        assert!((ride.distance - 45_500.0).abs() < 1e-6);
        assert_eq!(ride.calories, Some(1050.0));
        assert_eq!(ride.elevation_gain, Some(1200.0));
        assert_eq!(ride.power.training_stress_score, Some(85.3));
        assert_eq!(ride.power.normalized_power, Some(210.0));
    }

    #[test]
    fn test_trademark_headers_keep_english_number_format() {
        let content = "\
Activity Type,Date,Calories,Time,Elev Gain,Training Stress Score®
Cycling,2024-01-06 09:00:00,\"1,050\",1:40:00,\"1,200\",85.3
";
        let batch = CsvImporter::new().import_str(content, "english.csv").unwrap();
        let ride = &batch.activities[0];
        assert_eq!(ride.calories, Some(1050.0));
        assert_eq!(ride.elevation_gain, Some(1200.0));
        assert_eq!(ride.power.training_stress_score, Some(85.3));
    }

    #[test]
    fn test_missing_required_column() {
        let content = "Title,Distance\nRun,5.0\n";
        let result = CsvImporter::new().import_str(content, "bad.csv");
        assert!(matches!(
            result,
            Err(crate::error::WrappedError::Import(ImportError::MissingColumn { .. }))
        ));
    }

    #[test]
    fn test_can_import() {
        let importer = CsvImporter::new();
        assert!(importer.can_import(Path::new("Activities.CSV")));
        assert!(!importer.can_import(Path::new("activities.json")));
    }
}

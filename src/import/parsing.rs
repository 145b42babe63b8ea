//! Field-level parsers shared by the activity importers.
//!
//! Every parser treats an empty string and the `--` placeholder as "missing". Optional
//! metrics stay `None` when missing; distance and duration fall back to zero because
//! they are always numeric on an [`Activity`](crate::models::Activity).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Decimal separator convention of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `1,234.5`
    Point,
    /// `1.234,5`
    Comma,
    /// Guess per value from the separators present
    Auto,
}

/// Whether a raw cell means "no value"
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "--"
}

/// Parse a number that may carry thousands separators, a decimal comma or a unit suffix
pub fn parse_number(value: &str, format: NumberFormat) -> Option<f64> {
    if is_missing(value) {
        return None;
    }

    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match resolve_format(&cleaned, format) {
        NumberFormat::Comma => cleaned.replace('.', "").replace(',', "."),
        _ => cleaned.replace(',', ""),
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn resolve_format(cleaned: &str, format: NumberFormat) -> NumberFormat {
    if format != NumberFormat::Auto {
        return format;
    }

    match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                NumberFormat::Comma
            } else {
                NumberFormat::Point
            }
        }
        (None, Some(comma)) => {
            // A single comma followed by exactly three digits reads as a thousands separator
            let digits_after = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && digits_after != 3 {
                NumberFormat::Comma
            } else {
                NumberFormat::Point
            }
        }
        (Some(_), None) => {
            if cleaned.matches('.').count() > 1 {
                NumberFormat::Comma
            } else {
                NumberFormat::Point
            }
        }
        (None, None) => NumberFormat::Point,
    }
}

/// Parse a distance cell into meters.
///
/// Bare numbers are kilometers, as in activity list exports. A `m` suffix means meters
/// and `mi` means miles.
pub fn parse_distance_meters(value: &str, format: NumberFormat) -> f64 {
    let Some(number) = parse_number(value, format) else {
        return 0.0;
    };

    let unit: String = value
        .trim()
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .chars()
        .rev()
        .collect::<String>()
        .trim()
        .to_lowercase();

    let meters = match unit.as_str() {
        "m" => number,
        "mi" | "miles" => number * 1609.344,
        _ => number * 1000.0,
    };
    meters.max(0.0)
}

/// Parse `H:MM:SS` or `MM:SS` into seconds.
///
/// The layout is decided by the number of colon-separated fields: three fields are
/// hours, minutes, seconds and two fields are minutes, seconds. A single number is
/// taken as seconds. Seconds may carry a fraction with either decimal separator.
pub fn parse_duration(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }

    let parts = value
        .trim()
        .split(':')
        .map(|part| part.trim().replace(',', ".").parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    if parts.iter().any(|part| *part < 0.0 || !part.is_finite()) {
        return None;
    }

    match parts.as_slice() {
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        [seconds] => Some(*seconds),
        _ => None,
    }
}

/// Parse a pace cell (`MM:SS` per km) into decimal minutes per km
pub fn parse_pace(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }

    let token = value.split_whitespace().next()?;
    match token.split(':').collect::<Vec<_>>().as_slice() {
        [minutes, seconds] => {
            let minutes = minutes.parse::<f64>().ok()?;
            let seconds = seconds.parse::<f64>().ok()?;
            Some(minutes + seconds / 60.0).filter(|pace| *pace > 0.0)
        }
        [minutes] => minutes
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|pace| *pace > 0.0),
        _ => None,
    }
}

/// Default wall-clock time for sources that only give a calendar day
fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a local start timestamp.
///
/// ISO-like text is tried first (with `T` or space, optional fractional seconds, optional
/// UTC offset which is dropped to keep the recorded wall clock). Then `D.M.YYYY` with an
/// optional trailing time. A date without a time is placed at 12:00:00.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if is_missing(trimmed) {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.naive_local());
    }

    let iso_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for format in &iso_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_time(default_time()));
    }

    let dotted_formats = ["%d.%m.%Y %H:%M:%S", "%d.%m.%Y %H:%M"];
    for format in &dotted_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d.%m.%Y") {
        return Some(date.and_time(default_time()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_missing_placeholders() {
        assert!(is_missing(""));
        assert!(is_missing("  "));
        assert!(is_missing("--"));
        assert!(!is_missing("0"));
    }

    #[test]
    fn test_parse_duration_positional() {
        assert_eq!(parse_duration("1:02:03"), Some(3723.0));
        assert_eq!(parse_duration("45:10"), Some(2710.0));
        assert_eq!(parse_duration("00:45:10"), Some(2710.0));
        assert_eq!(parse_duration("0:25:30.5"), Some(1530.5));
        assert_eq!(parse_duration("0:25:30,5"), Some(1530.5));
        assert_eq!(parse_duration("95"), Some(95.0));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration("--"), None);
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration("-1:00"), None);
    }

    #[test]
    fn test_parse_number_formats() {
        assert_eq!(parse_number("1,234.5", NumberFormat::Point), Some(1234.5));
        assert_eq!(parse_number("1.234,5", NumberFormat::Comma), Some(1234.5));
        assert_eq!(parse_number("12,5", NumberFormat::Comma), Some(12.5));
        assert_eq!(parse_number("152 bpm", NumberFormat::Point), Some(152.0));
        assert_eq!(parse_number("--", NumberFormat::Point), None);
        assert_eq!(parse_number("n/a", NumberFormat::Point), None);
    }

    #[test]
    fn test_parse_number_auto_detection() {
        assert_eq!(parse_number("12,5", NumberFormat::Auto), Some(12.5));
        assert_eq!(parse_number("1,234", NumberFormat::Auto), Some(1234.0));
        assert_eq!(parse_number("1.234.567", NumberFormat::Auto), Some(1234567.0));
        assert_eq!(parse_number("1.234,56", NumberFormat::Auto), Some(1234.56));
        assert_eq!(parse_number("1,234.56", NumberFormat::Auto), Some(1234.56));
        assert_eq!(parse_number("10.03", NumberFormat::Auto), Some(10.03));
    }

    #[test]
    fn test_parse_distance_units() {
        assert_eq!(parse_distance_meters("10.5", NumberFormat::Point), 10_500.0);
        assert_eq!(parse_distance_meters("10,5 km", NumberFormat::Comma), 10_500.0);
        assert_eq!(parse_distance_meters("1,500 m", NumberFormat::Point), 1500.0);
        assert_eq!(parse_distance_meters("--", NumberFormat::Point), 0.0);
        assert!((parse_distance_meters("1 mi", NumberFormat::Point) - 1609.344).abs() < 1e-9);
    }

    #[test]
    fn test_parse_pace() {
        assert_eq!(parse_pace("5:30"), Some(5.5));
        assert_eq!(parse_pace("5:30 /km"), Some(5.5));
        assert_eq!(parse_pace("--"), None);
        assert_eq!(parse_pace("0:00"), None);
    }

    #[test]
    fn test_parse_iso_datetimes() {
        let parsed = parse_datetime("2024-12-31 14:30:00").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(parsed.hour(), 14);

        let parsed = parse_datetime("2024-03-05T06:15:00.0").unwrap();
        assert_eq!(parsed.minute(), 15);

        // The offset is dropped, the recorded wall clock is kept
        let parsed = parse_datetime("2024-03-05T23:30:00+02:00").unwrap();
        assert_eq!(parsed.hour(), 23);
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_dotted_datetimes() {
        let parsed = parse_datetime("31.12.2024 14:30").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(parsed.hour(), 14);

        let parsed = parse_datetime("5.1.2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(parsed.hour(), 12);
    }

    #[test]
    fn test_parse_invalid_datetimes() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("--").is_none());
        assert!(parse_datetime("32.13.2024").is_none());
        assert!(parse_datetime("yesterday").is_none());
    }
}

//! Reading normalization.
//!
//! Coerces loosely-typed source rows into [`Reading`]s: numeric cells that do
//! not parse become absent, the timestamp must parse for every row, and the
//! result is sorted oldest first.

use chrono::{DateTime, NaiveDateTime, Utc};
use vitalwatch_adapters::{canonical_key, RawField, RawRecord};
use vitalwatch_types::{Reading, Vital};

use crate::error::{Error, Result};

/// Timestamp layouts carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Timestamp layouts without an offset; these are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The schema column a source column maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Timestamp,
    Vital(Vital),
}

impl Column {
    /// Map a source column name onto the reading schema.
    ///
    /// Matching is done on [`canonical_key`], so both the document schema
    /// (`blood_oxygen`) and the display schema (`Blood Oxygen`) resolve.
    fn from_name(name: &str) -> Option<Self> {
        let column = match canonical_key(name).as_str() {
            "timestamp" | "time" | "datetime" => Column::Timestamp,
            "temperature" | "temp" => Column::Vital(Vital::Temperature),
            "bloodoxygen" | "spo2" | "oxygen" => Column::Vital(Vital::BloodOxygen),
            "heartrate" | "hr" | "pulse" => Column::Vital(Vital::HeartRate),
            "respirationrate" | "respiratoryrate" | "rr" => Column::Vital(Vital::RespirationRate),
            "bloodpressure" | "bp" => Column::Vital(Vital::BloodPressure),
            _ => return None,
        };
        Some(column)
    }
}

/// Normalize a fetched batch into readings sorted by timestamp.
///
/// - A numeric cell that fails to parse (or is not finite) becomes absent.
/// - A missing column is absent for every row.
/// - A row without a parsable timestamp fails the whole batch with
///   [`Error::MalformedSourceData`].
/// - Duplicate timestamps are kept; the sort is stable.
pub fn normalize(records: Vec<RawRecord>) -> Result<Vec<Reading>> {
    let mut readings = records
        .iter()
        .enumerate()
        .map(|(index, record)| normalize_row(index, record))
        .collect::<Result<Vec<_>>>()?;

    readings.sort_by_key(|r| r.timestamp);
    Ok(readings)
}

fn normalize_row(index: usize, record: &RawRecord) -> Result<Reading> {
    let mut timestamp_field = None;
    let mut vitals: Vec<(Vital, &RawField)> = Vec::new();

    for (name, field) in record.iter() {
        match Column::from_name(name) {
            Some(Column::Timestamp) => timestamp_field = Some(field),
            Some(Column::Vital(vital)) => vitals.push((vital, field)),
            None => {}
        }
    }

    let field = timestamp_field.ok_or_else(|| {
        Error::MalformedSourceData(format!("row {}: no timestamp column", index + 1))
    })?;
    let timestamp = parse_timestamp(field).ok_or_else(|| {
        Error::MalformedSourceData(format!(
            "row {}: unparsable timestamp {}",
            index + 1,
            describe(field)
        ))
    })?;

    let mut reading = Reading::new(timestamp);
    for (vital, field) in vitals {
        match vital {
            Vital::Temperature => reading.temperature = parse_number(field),
            Vital::BloodOxygen => reading.blood_oxygen = parse_number(field),
            Vital::HeartRate => reading.heart_rate = parse_number(field),
            Vital::RespirationRate => reading.respiration_rate = parse_number(field),
            Vital::BloodPressure => reading.blood_pressure = parse_text(field),
        }
    }
    Ok(reading)
}

/// Coerce a cell to a finite number; anything else is absent.
pub fn parse_number(field: &RawField) -> Option<f64> {
    let value = match field {
        RawField::Null => return None,
        RawField::Number(n) => *n,
        RawField::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

fn parse_text(field: &RawField) -> Option<String> {
    match field {
        RawField::Null => None,
        RawField::Number(n) => Some(n.to_string()),
        RawField::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
    }
}

/// Parse a timestamp cell.
///
/// Accepts RFC 3339, space-separated date-times with or without an offset
/// (offset-less values are UTC), and numbers as Unix epoch seconds.
pub fn parse_timestamp(field: &RawField) -> Option<DateTime<Utc>> {
    match field {
        RawField::Null => None,
        RawField::Number(secs) => from_epoch_seconds(*secs),
        RawField::Text(s) => parse_timestamp_str(s.trim()),
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    s.parse::<f64>().ok().and_then(from_epoch_seconds)
}

fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

fn describe(field: &RawField) -> String {
    match field {
        RawField::Null => "(blank)".to_string(),
        RawField::Text(s) => format!("{:?}", s),
        RawField::Number(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(s: &str) -> RawField {
        RawField::Text(s.to_string())
    }

    fn row(time: &str) -> RawRecord {
        RawRecord::new().with("time", text(time))
    }

    #[test]
    fn test_sorts_ascending_and_absent_on_bad_number() {
        let records = vec![
            RawRecord::new()
                .with("timestamp", text("2024-01-01T00:00:01Z"))
                .with("temperature", text("37.2")),
            RawRecord::new()
                .with("timestamp", text("2024-01-01T00:00:00Z"))
                .with("temperature", text("abc")),
        ];

        let readings = normalize(records).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(readings[0].temperature, None);
        assert_eq!(readings[1].timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap());
        assert_eq!(readings[1].temperature, Some(37.2));
    }

    #[test]
    fn test_time_alias_and_missing_columns() {
        let readings = normalize(vec![row("2024-01-01T00:00:00Z")]).unwrap();
        assert_eq!(readings.len(), 1);
        assert!(readings[0].is_empty());
    }

    #[test]
    fn test_display_schema_columns() {
        let record = RawRecord::new()
            .with("Timestamp", text("2024-01-01 08:00:00+00:00"))
            .with("Blood Oxygen", text("97.5"))
            .with("Heart Rate", RawField::Number(72.0))
            .with("Respiration Rate", RawField::Null)
            .with("Blood Pressure", text(" 120/80 "))
            .with("Notes", text("ignored"));

        let reading = &normalize(vec![record]).unwrap()[0];
        assert_eq!(reading.blood_oxygen, Some(97.5));
        assert_eq!(reading.heart_rate, Some(72.0));
        assert_eq!(reading.respiration_rate, None);
        assert_eq!(reading.blood_pressure.as_deref(), Some("120/80"));
    }

    #[test]
    fn test_non_finite_numbers_are_absent() {
        assert_eq!(parse_number(&text("NaN")), None);
        assert_eq!(parse_number(&text("inf")), None);
        assert_eq!(parse_number(&RawField::Number(f64::NAN)), None);
        assert_eq!(parse_number(&text(" 0 ")), Some(0.0));
        assert_eq!(parse_number(&text("")), None);
    }

    #[test]
    fn test_unparsable_timestamp_fails_batch() {
        let records = vec![row("2024-01-01T00:00:00Z"), row("yesterday")];
        match normalize(records) {
            Err(Error::MalformedSourceData(msg)) => {
                assert!(msg.contains("row 2"), "{msg}");
                assert!(msg.contains("yesterday"), "{msg}");
            }
            other => panic!("expected malformed data, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_timestamp_column_fails_batch() {
        let records = vec![
            row("2024-01-01T00:00:00Z"),
            RawRecord::new().with("temperature", text("37.0")),
        ];
        match normalize(records) {
            Err(Error::MalformedSourceData(msg)) => {
                assert_eq!(msg, "row 2: no timestamp column");
            }
            other => panic!("expected malformed data, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch_is_ok() {
        assert!(normalize(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_timestamps_keep_order() {
        let records = vec![
            RawRecord::new()
                .with("timestamp", text("2024-01-01T00:00:00Z"))
                .with("heart_rate", text("70")),
            RawRecord::new()
                .with("timestamp", text("2024-01-01T00:00:00Z"))
                .with("heart_rate", text("71")),
        ];
        let readings = normalize(records).unwrap();
        assert_eq!(readings[0].heart_rate, Some(70.0));
        assert_eq!(readings[1].heart_rate, Some(71.0));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        for input in [
            "2024-05-06T07:08:09Z",
            "2024-05-06T09:08:09+02:00",
            "2024-05-06 07:08:09+00:00",
            "2024-05-06 07:08:09",
            "2024-05-06T07:08:09",
        ] {
            assert_eq!(parse_timestamp(&text(input)), Some(expected), "{input}");
        }
        assert_eq!(
            parse_timestamp(&RawField::Number(expected.timestamp() as f64)),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&RawField::Null), None);
    }

    #[test]
    fn test_fractional_seconds_preserved() {
        let ts = parse_timestamp(&text("2024-05-06T07:08:09.250Z")).unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }
}

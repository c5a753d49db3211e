//! CSV export of the fetched readings.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use vitalwatch_adapters::spreadsheet;
use vitalwatch_types::{Reading, Vital};

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "patient_vitals.csv";

/// Write `readings` as CSV with the display header.
///
/// Absent values are written as empty cells so the file reads back through
/// the spreadsheet source unchanged.
pub fn write_csv<W: Write>(writer: W, readings: &[Reading]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(spreadsheet::header())?;

    for reading in readings {
        let mut row = Vec::with_capacity(Vital::ALL.len() + 1);
        row.push(
            reading
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        );
        for vital in Vital::ALL {
            let cell = match vital {
                Vital::BloodPressure => reading.blood_pressure.clone().unwrap_or_default(),
                _ => reading
                    .value(vital)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            };
            row.push(cell);
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Render `readings` to an in-memory CSV document.
pub fn to_csv_bytes(readings: &[Reading]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, readings)?;
    Ok(buf)
}

/// Write `readings` to `path`, replacing any existing file.
pub fn export_to_file<P: AsRef<Path>>(path: P, readings: &[Reading]) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, readings).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = readings.len(), "exported readings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize;
    use chrono::{DateTime, TimeZone, Utc};

    fn t(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, secs).unwrap()
    }

    fn sample() -> Vec<Reading> {
        vec![
            Reading::builder(t(0))
                .temperature(36.6)
                .blood_oxygen(97.0)
                .heart_rate(72.0)
                .respiration_rate(16.0)
                .build(),
            Reading::builder(t(10)).blood_pressure("120/80").build(),
        ]
    }

    #[test]
    fn test_csv_layout() {
        let csv = String::from_utf8(to_csv_bytes(&sample()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,Temperature,Blood Oxygen,Heart Rate,Respiration Rate,Blood Pressure",
                "2024-04-02T09:30:00Z,36.6,97,72,16,",
                "2024-04-02T09:30:10Z,,,,,120/80",
            ]
        );
    }

    #[test]
    fn test_export_reads_back() {
        let bytes = to_csv_bytes(&sample()).unwrap();
        let records = spreadsheet::parse_records(bytes.as_slice()).unwrap();
        let readings = normalize(records).unwrap();
        assert_eq!(readings, sample());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        export_to_file(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Timestamp,"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_export_empty_writes_header_only() {
        let csv = String::from_utf8(to_csv_bytes(&[]).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        assert!(export_to_file("/nonexistent/dir/out.csv", &sample()).is_err());
    }
}

//! Spreadsheet-export backend.
//!
//! Reads vitals from a CSV file with a header row, as produced by exporting a
//! spreadsheet or by the dashboard's own CSV export.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use vitalwatch_types::{BloodPressure, Vital};

use crate::{canonical_key, AdapterError, RawField, RawRecord, VitalsSource};

/// Column header of the timestamp column in files this crate writes.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Header row used for new files: timestamp, then every vital in display order.
pub fn header() -> Vec<&'static str> {
    std::iter::once(TIMESTAMP_COLUMN)
        .chain(Vital::ALL.iter().map(|v| v.column()))
        .collect()
}

/// Parse CSV text with a header row into raw records.
///
/// Blank cells become [`RawField::Null`]. Short rows are accepted and their
/// missing trailing columns are left out of the record.
pub fn parse_records<R: io::Read>(reader: R) -> Result<Vec<RawRecord>, AdapterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| (column.to_string(), RawField::from_cell(cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Render one CSV line for a manual entry, laid out against `headers`.
///
/// The timestamp and blood-pressure columns are filled; every other column
/// is left blank.
fn manual_entry_line(headers: &[String], measurement: &BloodPressure) -> Result<Vec<u8>, AdapterError> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let pressure = measurement.to_string();

    let cells: Vec<&str> = headers
        .iter()
        .map(|column| match canonical_key(column).as_str() {
            "timestamp" => timestamp.as_str(),
            "bloodpressure" => pressure.as_str(),
            _ => "",
        })
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&cells)?;
    finish(writer)
}

/// Flush an in-memory CSV writer and take its buffer.
fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, AdapterError> {
    writer
        .into_inner()
        .map_err(|e| AdapterError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
}

/// A data source that reads vitals from a CSV file.
///
/// The file is re-read on every fetch; spreadsheets are small and the
/// dashboard polls slowly.
#[derive(Debug)]
pub struct CsvSource {
    path: PathBuf,
    description: String,
}

impl CsvSource {
    /// Create a new CSV source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("csv: {}", path.display());
        Self { path, description }
    }

    /// Returns the path being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the existing header row, or `None` if the file is missing or empty.
    async fn existing_headers(&self) -> Result<Option<(Vec<String>, bool)>, AdapterError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        Ok(Some((headers, content.ends_with('\n'))))
    }
}

#[async_trait::async_trait]
impl VitalsSource for CsvSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, AdapterError> {
        let content = tokio::fs::read(&self.path).await?;
        parse_records(content.as_slice())
    }

    async fn submit(&self, measurement: &BloodPressure) -> Result<(), AdapterError> {
        let mut out = Vec::new();
        let headers = match self.existing_headers().await? {
            Some((headers, terminated)) => {
                if !terminated {
                    out.push(b'\n');
                }
                headers
            }
            None => {
                let headers: Vec<String> = header().into_iter().map(str::to_string).collect();
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(&headers)?;
                out.extend(finish(writer)?);
                headers
            }
        };
        out.extend(manual_entry_line(&headers, measurement)?);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&out).await?;
        file.flush().await?;

        tracing::debug!(path = %self.path.display(), %measurement, "appended manual entry");
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

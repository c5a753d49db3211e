//! Document-collection backend.
//!
//! Stores one JSON document per reading, newline-delimited. Document keys use
//! the collection schema (`timestamp`, `temperature`, `blood_oxygen`, ...).

use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use vitalwatch_types::BloodPressure;

use crate::{AdapterError, RawRecord, VitalsSource};

/// Document written for a manual entry.
///
/// Every vital other than blood pressure is serialized as an explicit `null`.
#[derive(Debug, Serialize)]
struct ManualEntryDocument {
    timestamp: String,
    temperature: Option<f64>,
    blood_oxygen: Option<f64>,
    heart_rate: Option<f64>,
    respiration_rate: Option<f64>,
    blood_pressure: String,
}

impl ManualEntryDocument {
    fn new(measurement: &BloodPressure) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            temperature: None,
            blood_oxygen: None,
            heart_rate: None,
            respiration_rate: None,
            blood_pressure: measurement.to_string(),
        }
    }
}

/// Parse newline-delimited JSON documents.
///
/// Blank lines are skipped. A line that is not a JSON object fails the whole
/// batch with [`AdapterError::Parse`].
pub fn parse_documents(content: &str) -> Result<Vec<RawRecord>, AdapterError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let value: serde_json::Value = serde_json::from_str(line.trim())
                .map_err(|e| AdapterError::Parse(format!("line {}: {}", index + 1, e)))?;
            RawRecord::from_json(value).ok_or_else(|| {
                AdapterError::Parse(format!("line {}: expected a JSON object", index + 1))
            })
        })
        .collect()
}

/// A data source backed by a newline-delimited JSON document collection.
#[derive(Debug)]
pub struct DocumentSource {
    path: PathBuf,
    description: String,
}

impl DocumentSource {
    /// Create a new document source for the given collection file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("documents: {}", path.display());
        Self { path, description }
    }

    /// Returns the collection file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl VitalsSource for DocumentSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, AdapterError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_documents(&content)
    }

    async fn submit(&self, measurement: &BloodPressure) -> Result<(), AdapterError> {
        let needs_newline = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => !content.is_empty() && !content.ends_with('\n'),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        let mut line = serde_json::to_string(&ManualEntryDocument::new(measurement))?;
        line.push('\n');
        if needs_newline {
            line.insert(0, '\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(path = %self.path.display(), %measurement, "stored manual entry document");
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawField;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_documents() -> &'static str {
        concat!(
            r#"{"timestamp":"2024-01-01T00:00:05Z","temperature":37.1,"heart_rate":80}"#,
            "\n\n",
            r#"{"timestamp":"2024-01-01T00:00:00Z","temperature":"38.4","blood_pressure":null}"#,
            "\n"
        )
    }

    #[test]
    fn test_parse_documents_skips_blank_lines() {
        let records = parse_documents(sample_documents()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("temperature"), Some(&RawField::Number(37.1)));
        assert_eq!(
            records[1].get("temperature"),
            Some(&RawField::Text("38.4".to_string()))
        );
    }

    #[test]
    fn test_parse_documents_rejects_bad_line() {
        let err = parse_documents("{\"timestamp\":1}\nnot json\n").unwrap_err();
        match err {
            AdapterError::Parse(msg) => assert!(msg.starts_with("line 2")),
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(parse_documents("[1,2]\n"), Err(AdapterError::Parse(_))));
    }

    #[tokio::test]
    async fn test_document_source_fetch_and_submit() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", sample_documents().trim_end()).unwrap();

        let source = DocumentSource::new(file.path());
        source.submit(&BloodPressure::new(121, 79).unwrap()).await.unwrap();

        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 3);
        let entry = &records[2];
        assert_eq!(entry.get("blood_pressure"), Some(&RawField::Text("121/79".to_string())));
        assert_eq!(entry.get("temperature"), Some(&RawField::Null));
        assert_eq!(entry.get("respiration_rate"), Some(&RawField::Null));
    }

    #[tokio::test]
    async fn test_document_source_missing_file() {
        let source = DocumentSource::new("/nonexistent/vitals.jsonl");
        assert!(matches!(source.fetch().await, Err(AdapterError::Io(_))));
        assert_eq!(source.description(), "documents: /nonexistent/vitals.jsonl");
    }
}

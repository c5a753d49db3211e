//! Append-only alert log storage.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::SecondsFormat;
use parking_lot::Mutex;
use thiserror::Error;
use vitalwatch_adapters::RawField;
use vitalwatch_types::{AlertEvent, AlertKind};

use crate::data::normalize::parse_timestamp;

/// Header row of the alert log file.
pub const HEADER: [&str; 2] = ["Timestamp", "Alert"];

/// The alert log could not be read or written.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Durable storage behind the [`AlertStore`](super::AlertStore).
///
/// Implementations only append; they never rewrite or truncate existing
/// entries.
pub trait AlertLog: Send + std::fmt::Debug {
    /// Persist one event at the end of the log.
    fn append(&mut self, event: &AlertEvent) -> Result<(), PersistenceError>;

    /// Read back every event in log order.
    fn load(&mut self) -> Result<Vec<AlertEvent>, PersistenceError>;
}

/// Alert log stored as a two-column CSV file (`Timestamp,Alert`).
#[derive(Debug)]
pub struct CsvAlertLog {
    path: PathBuf,
}

impl CsvAlertLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }
}

impl AlertLog for CsvAlertLog {
    fn append(&mut self, event: &AlertEvent) -> Result<(), PersistenceError> {
        let needs_header = self.needs_header();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        let timestamp = event.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        writer.write_record([timestamp.as_str(), event.message.as_str()])?;
        writer.flush()?;
        Ok(())
    }

    fn load(&mut self) -> Result<Vec<AlertEvent>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut events = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let (Some(timestamp), Some(message)) = (row.get(0), row.get(1)) else {
                tracing::warn!(line = index + 2, "skipping short alert log row");
                continue;
            };
            let Some(timestamp) = parse_timestamp(&RawField::Text(timestamp.to_string())) else {
                tracing::warn!(line = index + 2, timestamp, "skipping alert with bad timestamp");
                continue;
            };
            let Some(kind) = AlertKind::from_message(message) else {
                tracing::warn!(line = index + 2, message, "skipping unknown alert message");
                continue;
            };
            events.push(AlertEvent {
                timestamp,
                kind,
                message: message.to_string(),
            });
        }
        Ok(events)
    }
}

/// In-memory alert log.
///
/// Clones share the same storage, so a test can keep a handle and inspect
/// what the store wrote. [`set_failing`](Self::set_failing) makes every
/// append fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryAlertLog {
    events: Arc<Mutex<Vec<AlertEvent>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryAlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing events, as if they had been persisted earlier.
    pub fn with_events(events: Vec<AlertEvent>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events)),
            failing: Arc::default(),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().clone()
    }
}

impl AlertLog for MemoryAlertLog {
    fn append(&mut self, event: &AlertEvent) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("alert log unavailable").into());
        }
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Vec<AlertEvent>, PersistenceError> {
        Ok(self.events())
    }
}

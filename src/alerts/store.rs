//! The alert store: the single writer in front of an [`AlertLog`].

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use vitalwatch_types::{AlertEvent, AlertKind};

use super::log::{AlertLog, PersistenceError};

struct Inner {
    log: Box<dyn AlertLog>,
    events: Vec<AlertEvent>,
    last_recorded: HashMap<AlertKind, DateTime<Utc>>,
}

/// Append-only record of alert events.
///
/// Every call to [`record`](Self::record) appends, unless a suppression
/// window is configured and the same kind was recorded within it. Appends
/// are serialized by a mutex, so the store can be shared between the
/// refresh loop and the UI.
pub struct AlertStore {
    inner: Mutex<Inner>,
    suppress_for: Option<chrono::Duration>,
}

impl std::fmt::Debug for AlertStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("AlertStore")
            .field("log", &inner.log)
            .field("events", &inner.events.len())
            .field("suppress_for", &self.suppress_for)
            .finish()
    }
}

impl AlertStore {
    /// Open a store over `log`, loading the events it already holds.
    pub fn open(
        mut log: Box<dyn AlertLog>,
        suppress_for: Option<Duration>,
    ) -> Result<Self, PersistenceError> {
        let events = log.load()?;

        let mut last_recorded = HashMap::new();
        for event in &events {
            let last = last_recorded.entry(event.kind).or_insert(event.timestamp);
            if event.timestamp > *last {
                *last = event.timestamp;
            }
        }

        tracing::debug!(loaded = events.len(), "opened alert store");
        Ok(Self {
            inner: Mutex::new(Inner {
                log,
                events,
                last_recorded,
            }),
            suppress_for: suppress_for.and_then(|d| chrono::Duration::from_std(d).ok()),
        })
    }

    /// Record that `kind` fired, detected at `at`.
    ///
    /// Returns the appended event, or `None` when it was suppressed. The
    /// in-memory log only changes after the durable write succeeds.
    pub fn record(
        &self,
        kind: AlertKind,
        at: DateTime<Utc>,
    ) -> Result<Option<AlertEvent>, PersistenceError> {
        let mut inner = self.inner.lock();

        if let (Some(window), Some(last)) = (self.suppress_for, inner.last_recorded.get(&kind)) {
            let elapsed = at - *last;
            if elapsed >= chrono::Duration::zero() && elapsed < window {
                tracing::debug!(?kind, "alert suppressed");
                return Ok(None);
            }
        }

        let event = AlertEvent::new(kind, at);
        inner.log.append(&event)?;
        inner.last_recorded.insert(kind, at);
        inner.events.push(event.clone());

        tracing::info!(?kind, message = %event.message, "alert recorded");
        Ok(Some(event))
    }

    /// All events in recording order.
    pub fn list(&self) -> Vec<AlertEvent> {
        self.inner.lock().events.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{CsvAlertLog, MemoryAlertLog};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, secs).unwrap()
    }

    #[test]
    fn test_repeated_records_are_not_deduplicated() {
        let log = MemoryAlertLog::new();
        let store = AlertStore::open(Box::new(log.clone()), None).unwrap();

        for secs in 0..3 {
            let event = store.record(AlertKind::Temperature, at(secs)).unwrap();
            assert!(event.is_some());
        }

        assert_eq!(store.len(), 3);
        assert_eq!(log.events().len(), 3);
        assert!(store
            .list()
            .iter()
            .all(|e| e.message == "Temperature Alert"));
    }

    #[test]
    fn test_suppression_window() {
        let store =
            AlertStore::open(Box::new(MemoryAlertLog::new()), Some(Duration::from_secs(30))).unwrap();

        assert!(store.record(AlertKind::HeartRate, at(0)).unwrap().is_some());
        assert!(store.record(AlertKind::HeartRate, at(10)).unwrap().is_none());
        // Other kinds are tracked separately
        assert!(store.record(AlertKind::BloodOxygen, at(10)).unwrap().is_some());
        assert!(store.record(AlertKind::HeartRate, at(30)).unwrap().is_some());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_suppression_uses_loaded_history() {
        let earlier = vec![AlertEvent::new(AlertKind::Temperature, at(0))];
        let store = AlertStore::open(
            Box::new(MemoryAlertLog::with_events(earlier)),
            Some(Duration::from_secs(60)),
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.record(AlertKind::Temperature, at(20)).unwrap().is_none());
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let log = MemoryAlertLog::new();
        let store = AlertStore::open(Box::new(log.clone()), None).unwrap();

        log.set_failing(true);
        assert!(store.record(AlertKind::RespirationRate, at(0)).is_err());
        assert!(store.is_empty());

        log.set_failing(false);
        assert!(store.record(AlertKind::RespirationRate, at(1)).unwrap().is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unwritable_file_is_surfaced() {
        let store =
            AlertStore::open(Box::new(CsvAlertLog::new("/nonexistent/dir/alerts.csv")), None).unwrap();
        let err = store.record(AlertKind::Temperature, at(0)).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reopen_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.csv");

        {
            let store = AlertStore::open(Box::new(CsvAlertLog::new(&path)), None).unwrap();
            store.record(AlertKind::Temperature, at(0)).unwrap();
            store.record(AlertKind::HeartRate, at(1)).unwrap();
        }

        let store = AlertStore::open(Box::new(CsvAlertLog::new(&path)), None).unwrap();
        let kinds: Vec<AlertKind> = store.list().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Temperature, AlertKind::HeartRate]);
    }

    #[test]
    fn test_concurrent_records() {
        let store = Arc::new(AlertStore::open(Box::new(MemoryAlertLog::new()), None).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for secs in 0..25 {
                        store.record(AlertKind::ALL[i], at(secs)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 100);
    }
}

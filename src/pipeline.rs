//! One poll cycle: fetch, normalize, evaluate, record, derive connectivity.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use vitalwatch_adapters::{AdapterError, VitalsSource};
use vitalwatch_types::{AlertKind, ConnectivityStatus, Reading};

use crate::alerts::AlertStore;
use crate::data::{connectivity, normalize, Thresholds};
use crate::error::{Error, Result};

/// Default bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub thresholds: Thresholds,
    pub offline_after: Duration,
    pub fetch_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            offline_after: connectivity::DEFAULT_OFFLINE_AFTER,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Category of a problem reported by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    MalformedSourceData,
    SourceUnavailable,
    Persistence,
}

/// A problem surfaced to the operator. Ticks never fail; they carry notices.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&Error> for Notice {
    fn from(error: &Error) -> Self {
        let kind = match error {
            Error::MalformedSourceData(_) => NoticeKind::MalformedSourceData,
            Error::SourceUnavailable(_) => NoticeKind::SourceUnavailable,
            Error::Persistence(_) => NoticeKind::Persistence,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Everything the dashboard needs from one tick.
#[derive(Debug, Clone)]
pub struct VitalsFrame {
    /// Tick sequence number, starting at 1.
    pub tick: u64,
    pub updated_at: DateTime<Utc>,
    /// Normalized readings, oldest first. Empty when the fetch failed.
    pub readings: Vec<Reading>,
    /// Kinds that fired for the latest reading.
    pub fired: BTreeSet<AlertKind>,
    pub connectivity: ConnectivityStatus,
    pub notices: Vec<Notice>,
}

impl VitalsFrame {
    /// The newest reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// The last `n` readings, oldest first.
    pub fn window(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    /// The most recent blood pressure present in the working set.
    pub fn last_blood_pressure(&self) -> Option<&str> {
        self.readings
            .iter()
            .rev()
            .find_map(|r| r.blood_pressure.as_deref())
    }

    pub fn has_notice(&self, kind: NoticeKind) -> bool {
        self.notices.iter().any(|n| n.kind == kind)
    }
}

/// The evaluation pipeline for one source.
#[derive(Debug)]
pub struct Pipeline {
    source: Arc<dyn VitalsSource>,
    store: Arc<AlertStore>,
    settings: PipelineSettings,
    last_seen: Option<DateTime<Utc>>,
    ticks: u64,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn VitalsSource>,
        store: Arc<AlertStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
            last_seen: None,
            ticks: 0,
        }
    }

    pub fn source(&self) -> &Arc<dyn VitalsSource> {
        &self.source
    }

    pub fn store(&self) -> &Arc<AlertStore> {
        &self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one full cycle with `now` as the detection time.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> VitalsFrame {
        self.ticks += 1;
        let mut notices = Vec::new();

        let readings = match self.fetch().await {
            Ok(readings) => readings,
            Err(e) => {
                tracing::warn!(source = self.source.description(), error = %e, "fetch failed");
                notices.push(Notice::from(&e));
                Vec::new()
            }
        };

        if let Some(newest) = readings.last() {
            self.last_seen = Some(match self.last_seen {
                Some(seen) => seen.max(newest.timestamp),
                None => newest.timestamp,
            });
        }

        let fired = readings
            .last()
            .map(|latest| crate::data::evaluate(latest, &self.settings.thresholds))
            .unwrap_or_default();

        for kind in &fired {
            if let Err(e) = self.store.record(*kind, now) {
                let e = Error::from(e);
                tracing::error!(?kind, error = %e, "alert was not persisted");
                notices.push(Notice::from(&e));
            }
        }

        let connectivity =
            connectivity::status(self.last_seen, now, self.settings.offline_after);

        tracing::debug!(
            tick = self.ticks,
            readings = readings.len(),
            fired = fired.len(),
            online = connectivity.online,
            "tick complete"
        );

        VitalsFrame {
            tick: self.ticks,
            updated_at: now,
            readings,
            fired,
            connectivity,
            notices,
        }
    }

    /// Fetch and normalize, bounded by the fetch timeout.
    pub async fn fetch(&self) -> Result<Vec<Reading>> {
        let records = tokio::time::timeout(self.settings.fetch_timeout, self.source.fetch())
            .await
            .map_err(|_| AdapterError::Timeout)??;
        normalize(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::MemoryAlertLog;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use vitalwatch_adapters::{BloodPressure, RawField, RawRecord};

    /// Returns one scripted batch per fetch, then an empty one.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        batches: Mutex<VecDeque<std::result::Result<Vec<RawRecord>, AdapterError>>>,
        delay: Option<Duration>,
    }

    impl ScriptedSource {
        fn new(batches: Vec<std::result::Result<Vec<RawRecord>, AdapterError>>) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                delay: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl VitalsSource for ScriptedSource {
        async fn fetch(&self) -> std::result::Result<Vec<RawRecord>, AdapterError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.batches.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn submit(&self, _measurement: &BloodPressure) -> std::result::Result<(), AdapterError> {
            Ok(())
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    fn t(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, secs).unwrap()
    }

    fn heart_rate_row(secs: u32, heart_rate: Option<f64>) -> RawRecord {
        RawRecord::new()
            .with("timestamp", RawField::Text(t(secs).to_rfc3339()))
            .with(
                "heart_rate",
                heart_rate.map(RawField::Number).unwrap_or(RawField::Null),
            )
    }

    fn pipeline(source: ScriptedSource, log: MemoryAlertLog) -> Pipeline {
        let store = Arc::new(AlertStore::open(Box::new(log), None).unwrap());
        Pipeline::new(Arc::new(source), store, PipelineSettings::default())
    }

    #[tokio::test]
    async fn test_heart_rate_sequence_end_to_end() {
        let values = [Some(72.0), Some(58.0), Some(101.0), None];
        // Each poll sees the series so far
        let batches = (1..=values.len())
            .map(|n| {
                Ok(values[..n]
                    .iter()
                    .enumerate()
                    .map(|(i, v)| heart_rate_row(i as u32, *v))
                    .collect())
            })
            .collect();

        let log = MemoryAlertLog::new();
        let mut pipeline = pipeline(ScriptedSource::new(batches), log.clone());

        let mut fired_per_tick = Vec::new();
        for (i, _) in values.iter().enumerate() {
            let frame = pipeline.tick(t(i as u32 + 1)).await;
            assert!(frame.notices.is_empty());
            assert!(frame.connectivity.online);
            fired_per_tick.push(frame.fired.contains(&AlertKind::HeartRate));
        }

        assert_eq!(fired_per_tick, vec![false, true, true, false]);
        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, t(2));
        assert_eq!(events[1].timestamp, t(3));
        assert!(events.iter().all(|e| e.message == "Heart Rate Alert"));
    }

    #[tokio::test]
    async fn test_source_failure_keeps_last_seen() {
        let batches = vec![
            Ok(vec![heart_rate_row(0, Some(80.0))]),
            Err(AdapterError::Connection("refused".to_string())),
        ];
        let mut pipeline = pipeline(ScriptedSource::new(batches), MemoryAlertLog::new());

        let first = pipeline.tick(t(5)).await;
        assert!(first.connectivity.online);

        let second = pipeline.tick(t(30)).await;
        assert!(second.readings.is_empty());
        assert!(second.fired.is_empty());
        assert!(second.has_notice(NoticeKind::SourceUnavailable));
        assert!(!second.connectivity.online);
        assert_eq!(second.connectivity.last_seen, Some(t(0)));
        assert_eq!(second.connectivity.staleness_seconds, Some(30.0));
    }

    #[tokio::test]
    async fn test_malformed_batch_records_nothing() {
        let bad = RawRecord::new()
            .with("timestamp", RawField::Text("soon".to_string()))
            .with("heart_rate", RawField::Number(150.0));
        let log = MemoryAlertLog::new();
        let mut pipeline = pipeline(ScriptedSource::new(vec![Ok(vec![bad])]), log.clone());

        let frame = pipeline.tick(t(1)).await;
        assert!(frame.has_notice(NoticeKind::MalformedSourceData));
        assert!(frame.readings.is_empty());
        assert!(log.events().is_empty());
        assert_eq!(frame.connectivity, ConnectivityStatus::offline());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_a_notice() {
        let log = MemoryAlertLog::new();
        log.set_failing(true);
        let rows = vec![heart_rate_row(0, Some(130.0))];
        let mut pipeline = pipeline(ScriptedSource::new(vec![Ok(rows)]), log);

        let frame = pipeline.tick(t(1)).await;
        assert!(frame.fired.contains(&AlertKind::HeartRate));
        assert!(frame.has_notice(NoticeKind::Persistence));
        assert!(pipeline.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let mut source = ScriptedSource::new(vec![Ok(vec![heart_rate_row(0, Some(70.0))])]);
        source.delay = Some(Duration::from_secs(60));
        let mut pipeline = pipeline(source, MemoryAlertLog::new());

        let frame = pipeline.tick(t(1)).await;
        assert!(frame.has_notice(NoticeKind::SourceUnavailable));
        assert!(frame.readings.is_empty());
    }

    #[test]
    fn test_frame_helpers() {
        let readings = vec![
            Reading::builder(t(0)).blood_pressure("118/75").build(),
            Reading::builder(t(1)).heart_rate(70.0).build(),
            Reading::builder(t(2)).heart_rate(71.0).build(),
        ];
        let frame = VitalsFrame {
            tick: 1,
            updated_at: t(3),
            readings,
            fired: BTreeSet::new(),
            connectivity: ConnectivityStatus::offline(),
            notices: Vec::new(),
        };

        assert_eq!(frame.latest().map(|r| r.timestamp), Some(t(2)));
        assert_eq!(frame.window(2).len(), 2);
        assert_eq!(frame.window(10).len(), 3);
        assert_eq!(frame.last_blood_pressure(), Some("118/75"));
    }
}

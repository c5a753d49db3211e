//! Periodic refresh loop.
//!
//! Runs [`Pipeline::tick`] on a fixed interval in a background task and
//! publishes each frame into a single-slot `watch` channel. Readers always
//! see the latest frame; a slow reader skips frames instead of queueing them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pipeline::{Pipeline, VitalsFrame};

/// Default refresh interval.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(10);

/// The latest published frame, `None` until the first tick completes.
pub type FrameSlot = watch::Receiver<Option<Arc<VitalsFrame>>>;

/// Spawns the refresh loop.
pub struct Scheduler;

impl Scheduler {
    /// Start ticking `pipeline` every `every`. The first tick runs immediately.
    ///
    /// A zero interval falls back to [`DEFAULT_REFRESH`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut pipeline: Pipeline, every: Duration) -> SchedulerHandle {
        let every = if every.is_zero() {
            tracing::warn!("zero refresh interval, using the default");
            DEFAULT_REFRESH
        } else {
            every
        };
        let (frame_tx, frame_rx) = watch::channel(None);
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn({
            let refresh = refresh.clone();
            async move {
                let mut interval = tokio::time::interval(every);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = refresh.notified() => {
                            tracing::debug!("manual refresh");
                            interval.reset();
                        }
                        changed = stop_rx.changed() => {
                            if changed.is_err() || *stop_rx.borrow() {
                                break;
                            }
                            continue;
                        }
                    }

                    let frame = pipeline.tick(Utc::now()).await;
                    if frame_tx.send(Some(Arc::new(frame))).is_err() {
                        // Every reader is gone
                        break;
                    }
                }
                tracing::debug!("refresh loop stopped");
            }
        });

        SchedulerHandle {
            frames: frame_rx,
            refresh,
            stop_tx,
            task,
        }
    }
}

/// Control handle for a running refresh loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    frames: FrameSlot,
    refresh: Arc<Notify>,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// A new reader of the frame slot.
    pub fn subscribe(&self) -> FrameSlot {
        self.frames.clone()
    }

    /// Run a tick now instead of waiting for the interval.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Stop the loop and wait for the in-flight tick to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "refresh loop ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertStore, MemoryAlertLog};
    use crate::pipeline::PipelineSettings;
    use vitalwatch_adapters::{AdapterError, BloodPressure, RawField, RawRecord, VitalsSource};

    /// Serves the same single reading on every fetch.
    #[derive(Debug)]
    struct FixedSource;

    #[async_trait::async_trait]
    impl VitalsSource for FixedSource {
        async fn fetch(&self) -> Result<Vec<RawRecord>, AdapterError> {
            Ok(vec![RawRecord::new()
                .with("timestamp", RawField::Text("2024-01-01T00:00:00Z".to_string()))
                .with("heart_rate", RawField::Number(72.0))])
        }

        async fn submit(&self, _measurement: &BloodPressure) -> Result<(), AdapterError> {
            Ok(())
        }

        fn description(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline() -> Pipeline {
        let store = AlertStore::open(Box::new(MemoryAlertLog::new()), None).unwrap();
        Pipeline::new(Arc::new(FixedSource), Arc::new(store), PipelineSettings::default())
    }

    async fn next_tick(frames: &mut FrameSlot) -> u64 {
        frames.changed().await.unwrap();
        let frame = frames.borrow_and_update().clone();
        frame.map(|f| f.tick).unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let handle = Scheduler::spawn(pipeline(), Duration::from_secs(10));
        let mut frames = handle.subscribe();

        assert_eq!(next_tick(&mut frames).await, 1);
        assert_eq!(next_tick(&mut frames).await, 2);

        let frame = frames.borrow().clone().unwrap();
        assert_eq!(frame.readings.len(), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh() {
        let handle = Scheduler::spawn(pipeline(), Duration::from_secs(3600));
        let mut frames = handle.subscribe();

        assert_eq!(next_tick(&mut frames).await, 1);
        handle.refresh_now();
        let started = tokio::time::Instant::now();
        assert_eq!(next_tick(&mut frames).await, 2);
        assert!(started.elapsed() < Duration::from_secs(3600));

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_ticks() {
        let handle = Scheduler::spawn(pipeline(), Duration::ZERO);
        let mut frames = handle.subscribe();

        assert_eq!(next_tick(&mut frames).await, 1);
        assert_eq!(next_tick(&mut frames).await, 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_loop() {
        let handle = Scheduler::spawn(pipeline(), Duration::from_secs(10));
        let mut frames = handle.subscribe();
        assert_eq!(next_tick(&mut frames).await, 1);

        handle.stop().await;
        // Sender is dropped with the task
        assert!(frames.changed().await.is_err());
    }
}

//! # vitalwatch
//!
//! A terminal dashboard and library for watching a patient's vital signs.
//!
//! Readings are fetched from a pluggable source on a fixed interval,
//! normalized, checked against safe ranges and turned into an append-only
//! alert log. The connectivity of the source is derived from how old the
//! newest reading is.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//! │  │ scheduler │──▶│ pipeline │──▶│   app   │──▶│    ui    │  │
//! │  │  (timer)  │   │  (tick)  │   │ (state) │   │(ratatui) │  │
//! │  └───────────┘   └────┬─────┘   └─────────┘   └──────────┘  │
//! │                       │                                     │
//! │             ┌─────────┼──────────┐                          │
//! │             ▼         ▼          ▼                          │
//! │        ┌────────┐ ┌──────┐ ┌─────────┐                      │
//! │        │ source │ │ data │ │ alerts  │                      │
//! │        │(fetch) │ │      │ │ (store) │                      │
//! │        └────────┘ └──────┘ └─────────┘                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Normalizer, threshold evaluator, connectivity and trends
//! - **[`alerts`]**: The alert log, the alert store and per-session state
//! - **[`pipeline`]**: One poll tick, producing a [`VitalsFrame`]
//! - **[`scheduler`]**: Runs ticks on an interval and hands frames to readers
//! - **[`export`]**: CSV export of fetched readings
//! - **[`config`]**: Layered [`Settings`]
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal dashboard
//!
//! Sources live in the `vitalwatch-adapters` crate.
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a spreadsheet export
//! vitalwatch --csv vitals.csv
//!
//! # Watch a REST API
//! vitalwatch --http http://localhost:5000
//!
//! # Fetch once and write the readings to CSV
//! vitalwatch --csv vitals.csv --export patient_vitals.csv
//! ```
//!
//! ### Evaluating a reading
//!
//! ```
//! use chrono::Utc;
//! use vitalwatch::{evaluate, Thresholds};
//! use vitalwatch_types::{AlertKind, Reading};
//!
//! let reading = Reading::builder(Utc::now()).heart_rate(110.0).build();
//! let fired = evaluate(&reading, &Thresholds::default());
//! assert!(fired.contains(&AlertKind::HeartRate));
//! ```
//!
//! ### Running a pipeline
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitalwatch::{AlertStore, CsvAlertLog, Pipeline, PipelineSettings};
//! use vitalwatch_adapters::CsvSource;
//!
//! # tokio_test::block_on(async {
//! let store = AlertStore::open(Box::new(CsvAlertLog::new("alerts.csv")), None).unwrap();
//! let mut pipeline = Pipeline::new(
//!     Arc::new(CsvSource::new("vitals.csv")),
//!     Arc::new(store),
//!     PipelineSettings::default(),
//! );
//! let frame = pipeline.tick(chrono::Utc::now()).await;
//! println!("{} readings, {}", frame.readings.len(), frame.connectivity.label());
//! # });
//! ```

pub mod alerts;
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod pipeline;
pub mod scheduler;
pub mod ui;

// Re-export main types for convenience
pub use alerts::{AlertLog, AlertStore, CsvAlertLog, MemoryAlertLog, PersistenceError, Session};
pub use app::App;
pub use config::Settings;
pub use data::{evaluate, normalize, SafeRange, Thresholds, VitalStatus};
pub use error::{Error, Result};
pub use pipeline::{Notice, NoticeKind, Pipeline, PipelineSettings, VitalsFrame};
pub use scheduler::{Scheduler, SchedulerHandle};

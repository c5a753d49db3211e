//! # vitalwatch-adapters
//!
//! Backend adapters that supply raw vital-sign rows to the vitalwatch engine.
//!
//! Every backend implements the [`VitalsSource`] trait: `fetch` pulls the full
//! set of loosely-typed rows and `submit` pushes a manual blood-pressure entry.
//! Rows are returned as [`RawRecord`]s with the backend's own column names;
//! turning them into typed readings is the normalizer's job.
//!
//! ## Supported Backends
//!
//! - **Spreadsheet export** ([`CsvSource`]) - a CSV file with a header row
//! - **Document collection** ([`DocumentSource`]) - newline-delimited JSON
//!   documents, one per reading
//! - **REST API** (`http` feature, [`http::HttpSource`]) - `GET /data` returning
//!   JSON or CSV, `POST /data` for manual entries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vitalwatch_adapters::{CsvSource, VitalsSource};
//!
//! # tokio_test::block_on(async {
//! let source = CsvSource::new("vitals.csv");
//! let rows = source.fetch().await?;
//! println!("Fetched {} rows from {}", rows.len(), source.description());
//! # Ok::<_, vitalwatch_adapters::AdapterError>(())
//! # });
//! ```

pub mod document;
pub mod error;
pub mod record;
pub mod source;
pub mod spreadsheet;

#[cfg(feature = "http")]
pub mod http;

pub use document::DocumentSource;
pub use error::AdapterError;
pub use record::{canonical_key, RawField, RawRecord};
pub use source::VitalsSource;
pub use spreadsheet::CsvSource;

// Re-export types for convenience
pub use vitalwatch_types::{BloodPressure, Reading, Vital};

//! # vitalwatch-types
//!
//! Core types for patient vital-sign monitoring. This crate defines the data
//! model shared by the vitalwatch sources, the alert engine and the dashboard.
//!
//! ## Design Goals
//!
//! - **No engine logic**: types carry data and display metadata only; threshold
//!   rules and normalization live in the `vitalwatch` crate
//! - **Explicit absence**: every numeric vital is an `Option<f64>`, never a
//!   sentinel zero
//! - **Optional serialization**: enable the `serde` feature as needed
//!
//! ## Features
//!
//! - `serde`: JSON/TOML/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use vitalwatch_types::{AlertKind, Reading, Vital};
//!
//! let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
//! let reading = Reading::builder(at)
//!     .temperature(37.2)
//!     .heart_rate(72.0)
//!     .blood_pressure("120/80")
//!     .build();
//!
//! assert_eq!(reading.value(Vital::Temperature), Some(37.2));
//! assert_eq!(reading.value(Vital::BloodOxygen), None);
//! assert_eq!(AlertKind::HeartRate.message(), "Heart Rate Alert");
//! ```

mod alert;
mod connectivity;
mod pressure;
mod reading;

pub use alert::*;
pub use connectivity::*;
pub use pressure::*;
pub use reading::*;

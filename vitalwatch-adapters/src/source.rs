//! The pull/push interface every backend implements.

use std::fmt::Debug;

use async_trait::async_trait;
use vitalwatch_types::BloodPressure;

use crate::{AdapterError, RawRecord};

/// A backend that supplies vital-sign rows and accepts manual entries.
///
/// Implementations exist for spreadsheet exports, document collections and a
/// REST API; the dashboard picks one by configuration.
#[async_trait]
pub trait VitalsSource: Send + Sync + Debug {
    /// Fetch every row currently held by the backend.
    ///
    /// Rows may arrive in any order. Columns a backend does not have are
    /// simply missing from the records.
    async fn fetch(&self) -> Result<Vec<RawRecord>, AdapterError>;

    /// Push a manual blood-pressure entry.
    ///
    /// The stored row carries only the blood pressure; every other vital is
    /// null. It shows up in a later `fetch`.
    async fn submit(&self, measurement: &BloodPressure) -> Result<(), AdapterError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

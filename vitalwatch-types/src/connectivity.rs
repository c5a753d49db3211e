//! Device connectivity derived from reading recency.

use chrono::{DateTime, Utc};

/// Whether the sensing hardware is reporting.
///
/// A derived value; it is recomputed on every tick and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectivityStatus {
    pub online: bool,
    /// Timestamp of the most recent reading, if any was ever seen.
    pub last_seen: Option<DateTime<Utc>>,
    /// Seconds elapsed since `last_seen`.
    pub staleness_seconds: Option<f64>,
}

impl ConnectivityStatus {
    /// Status when no reading exists at all.
    pub fn offline() -> Self {
        Self {
            online: false,
            last_seen: None,
            staleness_seconds: None,
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        if self.online {
            "ONLINE"
        } else {
            "OFFLINE"
        }
    }
}

impl Default for ConnectivityStatus {
    fn default() -> Self {
        Self::offline()
    }
}

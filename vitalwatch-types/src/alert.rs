//! Alert kinds and logged alert events.

use chrono::{DateTime, Utc};

use crate::Vital;

/// Which threshold rule an alert came from.
///
/// Each kind maps to exactly one rule; several kinds may fire for the same
/// reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlertKind {
    Temperature,
    BloodOxygen,
    HeartRate,
    RespirationRate,
}

impl AlertKind {
    /// All alert kinds in evaluation order.
    pub const ALL: [AlertKind; 4] = [
        AlertKind::Temperature,
        AlertKind::BloodOxygen,
        AlertKind::HeartRate,
        AlertKind::RespirationRate,
    ];

    /// The fixed human-readable message written to the alert log.
    pub fn message(&self) -> &'static str {
        match self {
            AlertKind::Temperature => "Temperature Alert",
            AlertKind::BloodOxygen => "Oxygen Level Alert",
            AlertKind::HeartRate => "Heart Rate Alert",
            AlertKind::RespirationRate => "Respiration Rate Alert",
        }
    }

    /// Recover the kind from a logged message.
    pub fn from_message(message: &str) -> Option<Self> {
        let message = message.trim();
        Self::ALL.into_iter().find(|kind| kind.message() == message)
    }

    /// The kind monitoring `vital`. Blood pressure has none.
    pub fn for_vital(vital: Vital) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.vital() == vital)
    }

    /// The vital this kind monitors.
    pub fn vital(&self) -> Vital {
        match self {
            AlertKind::Temperature => Vital::Temperature,
            AlertKind::BloodOxygen => Vital::BloodOxygen,
            AlertKind::HeartRate => Vital::HeartRate,
            AlertKind::RespirationRate => Vital::RespirationRate,
        }
    }
}

/// A logged record that a vital breached its safe range.
///
/// The timestamp is the detection time, not the reading's timestamp.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: AlertKind,
    pub message: String,
}

impl AlertEvent {
    /// Create an event with the kind's fixed message.
    pub fn new(kind: AlertKind, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            kind,
            message: kind.message().to_string(),
        }
    }
}

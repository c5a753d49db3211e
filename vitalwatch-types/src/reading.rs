//! Reading - one timestamped snapshot of a patient's vital signs.

use chrono::{DateTime, Utc};

/// A monitored physiological quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Vital {
    Temperature,
    BloodOxygen,
    HeartRate,
    RespirationRate,
    BloodPressure,
}

impl Vital {
    /// All vitals in display (and export column) order.
    pub const ALL: [Vital; 5] = [
        Vital::Temperature,
        Vital::BloodOxygen,
        Vital::HeartRate,
        Vital::RespirationRate,
        Vital::BloodPressure,
    ];

    /// The numeric vitals, i.e. the ones that carry an automatic threshold rule.
    pub const NUMERIC: [Vital; 4] = [
        Vital::Temperature,
        Vital::BloodOxygen,
        Vital::HeartRate,
        Vital::RespirationRate,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Vital::Temperature => "Temperature",
            Vital::BloodOxygen => "Blood Oxygen",
            Vital::HeartRate => "Heart Rate",
            Vital::RespirationRate => "Respiration Rate",
            Vital::BloodPressure => "Blood Pressure",
        }
    }

    /// Display unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Vital::Temperature => "°C",
            Vital::BloodOxygen => "%",
            Vital::HeartRate => "bpm",
            Vital::RespirationRate => "breaths/min",
            Vital::BloodPressure => "mmHg",
        }
    }

    /// Column header used in the CSV export table.
    ///
    /// Identical to [`Vital::label`]; kept separate so the export schema does
    /// not change if display labels do.
    pub fn column(&self) -> &'static str {
        match self {
            Vital::Temperature => "Temperature",
            Vital::BloodOxygen => "Blood Oxygen",
            Vital::HeartRate => "Heart Rate",
            Vital::RespirationRate => "Respiration Rate",
            Vital::BloodPressure => "Blood Pressure",
        }
    }

    /// Number of decimals shown on the dashboard.
    pub fn precision(&self) -> usize {
        match self {
            Vital::Temperature | Vital::BloodOxygen => 1,
            _ => 0,
        }
    }
}

/// One timestamped snapshot of a patient's vital signs.
///
/// Numeric fields are either a finite number or `None`. A reading is
/// immutable once produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Body temperature in °C.
    pub temperature: Option<f64>,
    /// Peripheral oxygen saturation in %.
    pub blood_oxygen: Option<f64>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<f64>,
    /// Respiration rate in breaths per minute.
    pub respiration_rate: Option<f64>,
    /// Blood pressure as entered, `"systolic/diastolic"`.
    pub blood_pressure: Option<String>,
}

impl Reading {
    /// Create a reading with every vital absent.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: None,
            blood_oxygen: None,
            heart_rate: None,
            respiration_rate: None,
            blood_pressure: None,
        }
    }

    /// Create a builder for constructing readings.
    pub fn builder(timestamp: DateTime<Utc>) -> ReadingBuilder {
        ReadingBuilder::new(timestamp)
    }

    /// Numeric value of a vital, if present.
    ///
    /// Always `None` for [`Vital::BloodPressure`], which is a string.
    pub fn value(&self, vital: Vital) -> Option<f64> {
        match vital {
            Vital::Temperature => self.temperature,
            Vital::BloodOxygen => self.blood_oxygen,
            Vital::HeartRate => self.heart_rate,
            Vital::RespirationRate => self.respiration_rate,
            Vital::BloodPressure => None,
        }
    }

    /// Check if no vital is present.
    pub fn is_empty(&self) -> bool {
        Vital::NUMERIC.iter().all(|v| self.value(*v).is_none()) && self.blood_pressure.is_none()
    }
}

/// Builder for constructing `Reading` instances.
#[derive(Debug)]
pub struct ReadingBuilder {
    reading: Reading,
}

impl ReadingBuilder {
    /// Create a new builder for a reading taken at `timestamp`.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            reading: Reading::new(timestamp),
        }
    }

    pub fn temperature(mut self, value: f64) -> Self {
        self.reading.temperature = Some(value);
        self
    }

    pub fn blood_oxygen(mut self, value: f64) -> Self {
        self.reading.blood_oxygen = Some(value);
        self
    }

    pub fn heart_rate(mut self, value: f64) -> Self {
        self.reading.heart_rate = Some(value);
        self
    }

    pub fn respiration_rate(mut self, value: f64) -> Self {
        self.reading.respiration_rate = Some(value);
        self
    }

    pub fn blood_pressure(mut self, value: impl Into<String>) -> Self {
        self.reading.blood_pressure = Some(value.into());
        self
    }

    /// Set a numeric vital by kind. Ignored for [`Vital::BloodPressure`].
    pub fn value(mut self, vital: Vital, value: Option<f64>) -> Self {
        match vital {
            Vital::Temperature => self.reading.temperature = value,
            Vital::BloodOxygen => self.reading.blood_oxygen = value,
            Vital::HeartRate => self.reading.heart_rate = value,
            Vital::RespirationRate => self.reading.respiration_rate = value,
            Vital::BloodPressure => {}
        }
        self
    }

    /// Build the reading.
    pub fn build(self) -> Reading {
        self.reading
    }
}

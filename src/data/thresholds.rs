//! Threshold evaluation.
//!
//! Decides which vitals of a reading are outside their safe range. Evaluation
//! is pure: it reports which alert kinds fired and leaves recording them to
//! the caller.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::Deserialize;
use vitalwatch_types::{AlertKind, Reading};

/// An inclusive safe range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SafeRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl SafeRange {
    /// Range with both bounds.
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Range with only a lower bound.
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Check if `value` is safe. Both bounds are inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    /// Reject bounds that are not finite or that leave no safe value.
    pub fn validate(&self) -> Result<()> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                bail!("bound {} is not a finite number", bound);
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                bail!("min {} is greater than max {}", min, max);
            }
        }
        Ok(())
    }
}

/// Safe ranges for every vital with an automatic rule.
///
/// The defaults are the clinical table: temperature [36, 38] °C, blood
/// oxygen >= 90 %, heart rate [60, 100] bpm, respiration [12, 20] breaths/min.
/// Blood pressure has no rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub temperature: SafeRange,
    pub blood_oxygen: SafeRange,
    pub heart_rate: SafeRange,
    pub respiration_rate: SafeRange,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: SafeRange::between(36.0, 38.0),
            blood_oxygen: SafeRange::at_least(90.0),
            heart_rate: SafeRange::between(60.0, 100.0),
            respiration_rate: SafeRange::between(12.0, 20.0),
        }
    }
}

/// Display classification of a single vital value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalStatus {
    Normal,
    Alert,
    Absent,
}

impl VitalStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            VitalStatus::Normal => "OK",
            VitalStatus::Alert => "ALERT",
            VitalStatus::Absent => "-",
        }
    }
}

impl Thresholds {
    /// The safe range governing `kind`.
    pub fn range(&self, kind: AlertKind) -> &SafeRange {
        match kind {
            AlertKind::Temperature => &self.temperature,
            AlertKind::BloodOxygen => &self.blood_oxygen,
            AlertKind::HeartRate => &self.heart_rate,
            AlertKind::RespirationRate => &self.respiration_rate,
        }
    }

    /// Check every range; the error names the offending vital.
    pub fn validate(&self) -> Result<()> {
        for kind in AlertKind::ALL {
            if let Err(e) = self.range(kind).validate() {
                bail!("{} range: {}", kind.vital().label(), e);
            }
        }
        Ok(())
    }

    /// Classify a possibly-absent value against the rule for `kind`.
    pub fn status(&self, kind: AlertKind, value: Option<f64>) -> VitalStatus {
        match value {
            None => VitalStatus::Absent,
            Some(v) if self.range(kind).contains(v) => VitalStatus::Normal,
            Some(_) => VitalStatus::Alert,
        }
    }
}

/// Return every alert kind whose vital is present and out of range.
///
/// Absent values never fire.
pub fn evaluate(reading: &Reading, thresholds: &Thresholds) -> BTreeSet<AlertKind> {
    AlertKind::ALL
        .into_iter()
        .filter(|kind| thresholds.status(*kind, reading.value(kind.vital())) == VitalStatus::Alert)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitalwatch_types::Vital;

    fn reading() -> vitalwatch_types::ReadingBuilder {
        Reading::builder(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn fires(vital: Vital, value: f64) -> bool {
        let kind = AlertKind::ALL.into_iter().find(|k| k.vital() == vital).unwrap();
        let reading = reading().value(vital, Some(value)).build();
        evaluate(&reading, &Thresholds::default()).contains(&kind)
    }

    #[test]
    fn test_temperature_boundaries() {
        assert!(fires(Vital::Temperature, 35.9));
        assert!(!fires(Vital::Temperature, 36.0));
        assert!(!fires(Vital::Temperature, 37.2));
        assert!(!fires(Vital::Temperature, 38.0));
        assert!(fires(Vital::Temperature, 38.1));
    }

    #[test]
    fn test_temperature_sweep() {
        let mut t = 30.0;
        while t <= 42.0 {
            let expected = !(36.0..=38.0).contains(&t);
            assert_eq!(fires(Vital::Temperature, t), expected, "temperature {t}");
            t += 0.25;
        }
    }

    #[test]
    fn test_blood_oxygen_has_no_upper_bound() {
        assert!(fires(Vital::BloodOxygen, 89.9));
        assert!(!fires(Vital::BloodOxygen, 90.0));
        assert!(!fires(Vital::BloodOxygen, 100.0));
    }

    #[test]
    fn test_heart_rate_boundaries() {
        assert!(fires(Vital::HeartRate, 59.0));
        assert!(!fires(Vital::HeartRate, 60.0));
        assert!(!fires(Vital::HeartRate, 100.0));
        assert!(fires(Vital::HeartRate, 101.0));
    }

    #[test]
    fn test_respiration_rate_boundaries() {
        assert!(fires(Vital::RespirationRate, 11.0));
        assert!(!fires(Vital::RespirationRate, 12.0));
        assert!(!fires(Vital::RespirationRate, 20.0));
        assert!(fires(Vital::RespirationRate, 21.0));
    }

    #[test]
    fn test_absent_blood_oxygen_never_fires() {
        let reading = reading()
            .temperature(40.0)
            .heart_rate(130.0)
            .respiration_rate(30.0)
            .blood_pressure("190/120")
            .build();
        let fired = evaluate(&reading, &Thresholds::default());
        assert!(!fired.contains(&AlertKind::BloodOxygen));
        assert_eq!(fired.len(), 3);
    }

    #[test]
    fn test_empty_reading_fires_nothing() {
        let reading = reading().blood_pressure("200/150").build();
        assert!(evaluate(&reading, &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_status_classification() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.status(AlertKind::HeartRate, None), VitalStatus::Absent);
        assert_eq!(thresholds.status(AlertKind::HeartRate, Some(72.0)), VitalStatus::Normal);
        assert_eq!(thresholds.status(AlertKind::HeartRate, Some(40.0)), VitalStatus::Alert);
    }

    #[test]
    fn test_custom_range_deserializes() {
        let thresholds: Thresholds =
            serde_json::from_str(r#"{"heart_rate": {"min": 50, "max": 110}}"#).unwrap();
        assert_eq!(thresholds.heart_rate, SafeRange::between(50.0, 110.0));
        assert_eq!(thresholds.temperature, SafeRange::between(36.0, 38.0));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(Thresholds::default().validate().is_ok());
        assert!(SafeRange::at_least(90.0).validate().is_ok());
        assert!(SafeRange::between(60.0, 60.0).validate().is_ok());

        let thresholds = Thresholds {
            heart_rate: SafeRange::between(110.0, 50.0),
            ..Thresholds::default()
        };
        let err = thresholds.validate().unwrap_err().to_string();
        assert!(err.contains("Heart Rate"), "{err}");

        assert!(SafeRange::between(f64::NAN, 10.0).validate().is_err());
    }
}

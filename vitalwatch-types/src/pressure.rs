//! Manually entered blood-pressure measurements.

use core::fmt;
use core::ops::RangeInclusive;
use core::str::FromStr;

use thiserror::Error;

/// Accepted systolic range in mmHg.
pub const SYSTOLIC_RANGE: RangeInclusive<u16> = 50..=200;
/// Accepted diastolic range in mmHg.
pub const DIASTOLIC_RANGE: RangeInclusive<u16> = 30..=150;

/// Errors produced when building or parsing a blood-pressure value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BloodPressureError {
    #[error("systolic {0} mmHg is outside 50-200")]
    SystolicOutOfRange(u16),

    #[error("diastolic {0} mmHg is outside 30-150")]
    DiastolicOutOfRange(u16),

    #[error("expected \"systolic/diastolic\", got {0:?}")]
    Format(String),
}

/// A systolic/diastolic pair, bounded to the entry form's ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    systolic: u16,
    diastolic: u16,
}

impl BloodPressure {
    /// Create a measurement, rejecting values outside the accepted ranges.
    pub fn new(systolic: u16, diastolic: u16) -> Result<Self, BloodPressureError> {
        if !SYSTOLIC_RANGE.contains(&systolic) {
            return Err(BloodPressureError::SystolicOutOfRange(systolic));
        }
        if !DIASTOLIC_RANGE.contains(&diastolic) {
            return Err(BloodPressureError::DiastolicOutOfRange(diastolic));
        }
        Ok(Self {
            systolic,
            diastolic,
        })
    }

    pub fn systolic(&self) -> u16 {
        self.systolic
    }

    pub fn diastolic(&self) -> u16 {
        self.diastolic
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = BloodPressureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || BloodPressureError::Format(s.to_string());
        let (systolic, diastolic) = s.split_once('/').ok_or_else(format_err)?;
        let systolic = systolic.trim().parse().map_err(|_| format_err())?;
        let diastolic = diastolic.trim().parse().map_err(|_| format_err())?;
        Self::new(systolic, diastolic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(BloodPressure::new(50, 30).is_ok());
        assert!(BloodPressure::new(200, 150).is_ok());
        assert_eq!(
            BloodPressure::new(49, 80),
            Err(BloodPressureError::SystolicOutOfRange(49))
        );
        assert_eq!(
            BloodPressure::new(120, 151),
            Err(BloodPressureError::DiastolicOutOfRange(151))
        );
    }

    #[test]
    fn test_display_and_parse() {
        let bp: BloodPressure = " 120 / 80 ".parse().unwrap();
        assert_eq!(bp.systolic(), 120);
        assert_eq!(bp.diastolic(), 80);
        assert_eq!(bp.to_string(), "120/80");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "120-80".parse::<BloodPressure>(),
            Err(BloodPressureError::Format(_))
        ));
        assert!(matches!(
            "abc/80".parse::<BloodPressure>(),
            Err(BloodPressureError::Format(_))
        ));
        assert!(matches!(
            "250/80".parse::<BloodPressure>(),
            Err(BloodPressureError::SystolicOutOfRange(250))
        ));
    }
}

//! Trend levels for sparklines over the working window.

use vitalwatch_types::{Reading, Vital};

/// Number of distinct bar heights.
pub const LEVELS: u8 = 8;

/// Values of one vital across `readings`, oldest first.
pub fn series(readings: &[Reading], vital: Vital) -> Vec<Option<f64>> {
    readings.iter().map(|r| r.value(vital)).collect()
}

/// Normalize values to 0-7 for sparkline display.
///
/// Absent samples stay `None` so they render as gaps. When every present
/// value is equal they all map to the middle level.
pub fn levels(values: &[Option<f64>]) -> Vec<Option<u8>> {
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let range = max - min;
    values
        .iter()
        .map(|value| {
            value.map(|v| {
                if range <= f64::EPSILON {
                    LEVELS / 2
                } else {
                    let normalized = ((v - min) / range * f64::from(LEVELS - 1)).round() as u8;
                    normalized.min(LEVELS - 1)
                }
            })
        })
        .collect()
}

//! Human-friendly duration strings for configuration and CLI flags.

use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to seconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 0.001),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

/// Parse duration strings like "10s", "500ms", "1.5m", "2h".
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if let Ok(secs) = s.parse::<f64>() {
        return to_duration(secs, s);
    }

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            return to_duration(val * multiplier, s);
        }
    }

    bail!("Unknown duration format: {}", s)
}

fn to_duration(secs: f64, original: &str) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        bail!("Duration must be a non-negative number: {}", original);
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow::anyhow!("Duration out of range: {}", original))
}

/// Same as [`parse_duration`] but rejects zero, for intervals and timeouts.
pub fn parse_nonzero_duration(s: &str) -> Result<Duration> {
    let duration = parse_duration(s)?;
    if duration.is_zero() {
        bail!("Duration must be greater than zero: {}", s.trim());
    }
    Ok(duration)
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.0}s", secs)
    } else if secs < 3600.0 {
        format!("{}m{:02}s", d.as_secs() / 60, d.as_secs() % 60)
    } else {
        format!("{}h{:02}m", d.as_secs() / 3600, (d.as_secs() % 3600) / 60)
    }
}

/// Serde helpers so settings can hold durations as strings.
pub mod serde_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => crate::data::duration::parse_duration(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

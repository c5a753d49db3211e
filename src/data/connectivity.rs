//! Device liveness from reading recency.

use std::time::Duration;

use chrono::{DateTime, Utc};
use vitalwatch_types::ConnectivityStatus;

/// Default staleness allowed before the device is considered offline.
///
/// Twice the expected sensor report interval of 10 seconds.
pub const DEFAULT_OFFLINE_AFTER: Duration = Duration::from_secs(20);

/// Derive online/offline status from the newest reading timestamp.
///
/// Online iff `now - last_seen <= threshold`. Readings stamped in the future
/// (clock skew) count as fresh.
pub fn status(
    last_seen: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> ConnectivityStatus {
    let Some(last_seen) = last_seen else {
        return ConnectivityStatus::offline();
    };

    let staleness = (now - last_seen).num_milliseconds() as f64 / 1000.0;

    ConnectivityStatus {
        online: staleness <= threshold.as_secs_f64(),
        last_seen: Some(last_seen),
        staleness_seconds: Some(staleness),
    }
}

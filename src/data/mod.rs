//! Data processing for fetched vitals.
//!
//! This module turns raw source rows into typed readings and derives the
//! per-tick decisions the dashboard shows.
//!
//! ## Submodules
//!
//! - [`normalize`]: Coercion of raw rows into sorted [`Reading`](vitalwatch_types::Reading)s
//! - [`thresholds`]: Safe ranges and alert evaluation ([`Thresholds`], [`evaluate`])
//! - [`connectivity`]: Online/offline derivation from the newest reading
//! - [`trend`]: Sparkline series for the vitals view
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "10s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Vec<RawRecord> (from a VitalsSource)
//!        │
//!        ▼
//! normalize()
//!        │
//!        ├──▶ evaluate(latest, &Thresholds) ──▶ AlertStore::record()
//!        │
//!        └──▶ connectivity::status(last_seen, now)
//! ```

pub mod connectivity;
pub mod duration;
pub mod normalize;
pub mod thresholds;
pub mod trend;

pub use normalize::normalize;
pub use thresholds::{evaluate, SafeRange, Thresholds, VitalStatus};

//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`vitals`]: Latest values, sparkline trends and the recent-readings table
//! - [`alerts`]: The alert log, newest first
//! - [`pressure`]: Manual blood-pressure entry form
//! - [`export`]: CSV export of the fetched readings
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (vitals/alerts/pressure/export)      │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

use vitalwatch_types::Vital;

pub mod alerts;
pub mod common;
pub mod export;
pub mod pressure;
pub mod theme;
pub mod vitals;

pub use theme::Theme;

/// Placeholder for an absent value.
pub const ABSENT: &str = "N/A";

/// Format a vital for display with its fixed precision, or `N/A`.
pub fn format_value(vital: Vital, value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.*}", vital.precision(), v),
        None => ABSENT.to_string(),
    }
}

/// Same as [`format_value`] with the unit appended.
pub fn format_with_unit(vital: Vital, value: Option<f64>) -> String {
    match value {
        Some(_) => format!("{} {}", format_value(vital, value), vital.unit()),
        None => ABSENT.to_string(),
    }
}

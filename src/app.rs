//! Application state and navigation logic.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::runtime::Handle;
use vitalwatch_adapters::VitalsSource;
use vitalwatch_types::{
    AlertEvent, BloodPressure, BloodPressureError, DIASTOLIC_RANGE, SYSTOLIC_RANGE,
};

use crate::alerts::{AlertStore, Session};
use crate::config::Settings;
use crate::data::Thresholds;
use crate::pipeline::VitalsFrame;
use crate::scheduler::{FrameSlot, SchedulerHandle};
use crate::ui::Theme;

/// How long a status message stays on screen.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Latest values, trends and recent readings.
    Vitals,
    /// The alert log.
    Alerts,
    /// Manual blood-pressure entry.
    BloodPressure,
    /// CSV export of the fetched readings.
    Export,
}

impl View {
    pub const ALL: [View; 4] = [View::Vitals, View::Alerts, View::BloodPressure, View::Export];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Vitals => View::Alerts,
            View::Alerts => View::BloodPressure,
            View::BloodPressure => View::Export,
            View::Export => View::Vitals,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Vitals => View::Export,
            View::Alerts => View::Vitals,
            View::BloodPressure => View::Alerts,
            View::Export => View::BloodPressure,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Vitals => "Vitals",
            View::Alerts => "Alerts",
            View::BloodPressure => "BP Entry",
            View::Export => "Export",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Vitals => 0,
            View::Alerts => 1,
            View::BloodPressure => 2,
            View::Export => 3,
        }
    }
}

/// Which half of the blood-pressure form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BpField {
    Systolic,
    Diastolic,
}

/// Manual blood-pressure entry form.
///
/// Values are kept inside the accepted ranges at all times, so building the
/// measurement only fails if the ranges themselves disagree with the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpForm {
    pub systolic: u16,
    pub diastolic: u16,
    pub focus: BpField,
}

impl Default for BpForm {
    fn default() -> Self {
        Self {
            systolic: 120,
            diastolic: 80,
            focus: BpField::Systolic,
        }
    }
}

impl BpForm {
    /// Move the focused value by `delta`, clamped to its range.
    pub fn step(&mut self, delta: i32) {
        let (value, range) = match self.focus {
            BpField::Systolic => (&mut self.systolic, SYSTOLIC_RANGE),
            BpField::Diastolic => (&mut self.diastolic, DIASTOLIC_RANGE),
        };
        let stepped = (i32::from(*value) + delta)
            .clamp(i32::from(*range.start()), i32::from(*range.end()));
        // Clamped into a u16 range above
        *value = stepped as u16;
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            BpField::Systolic => BpField::Diastolic,
            BpField::Diastolic => BpField::Systolic,
        };
    }

    pub fn measurement(&self) -> Result<BloodPressure, BloodPressureError> {
        BloodPressure::new(self.systolic, self.diastolic)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data
    frames: FrameSlot,
    scheduler: SchedulerHandle,
    pub frame: Option<Arc<VitalsFrame>>,
    source: Arc<dyn VitalsSource>,
    store: Arc<AlertStore>,
    runtime: Handle,
    pub session: Session,
    pub thresholds: Thresholds,
    pub window: usize,
    submit_timeout: Duration,

    // Alerts view
    pub selected_alert_index: usize,

    // BP entry view
    pub bp_form: BpForm,

    // Export view
    pub export_path: PathBuf,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app over a running scheduler.
    ///
    /// Must be called from within a tokio runtime context; the runtime is
    /// used later for manual submissions.
    pub fn new(
        scheduler: SchedulerHandle,
        source: Arc<dyn VitalsSource>,
        store: Arc<AlertStore>,
        settings: &Settings,
    ) -> Result<Self> {
        let runtime = Handle::try_current().context("App must be created inside a tokio runtime")?;

        Ok(Self {
            running: true,
            current_view: View::Vitals,
            show_help: false,
            frames: scheduler.subscribe(),
            scheduler,
            frame: None,
            source,
            store,
            runtime,
            session: Session::new(),
            thresholds: settings.thresholds.clone(),
            window: settings.window.max(1),
            submit_timeout: settings.fetch_timeout,
            selected_alert_index: 0,
            bp_form: BpForm::default(),
            export_path: PathBuf::from(crate::export::DEFAULT_EXPORT_FILE),
            theme: Theme::auto_detect(),
            status_message: None,
        })
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn store(&self) -> &AlertStore {
        &self.store
    }

    /// Alerts, newest first.
    pub fn alerts(&self) -> Vec<AlertEvent> {
        let mut alerts = self.store.list();
        alerts.reverse();
        alerts
    }

    /// True while there are alerts this session has not looked at.
    pub fn has_unviewed_alerts(&self) -> bool {
        self.session.has_unviewed(&self.store)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Pick up the latest frame from the scheduler.
    ///
    /// Returns true if a new frame arrived since the last call.
    pub fn poll_frame(&mut self) -> bool {
        if !self.frames.has_changed().unwrap_or(false) {
            return false;
        }
        self.frame = self.frames.borrow_and_update().clone();

        let count = self.store.len();
        if self.selected_alert_index >= count {
            self.selected_alert_index = count.saturating_sub(1);
        }
        true
    }

    /// Ask the scheduler for an immediate tick.
    pub fn refresh(&mut self) {
        self.scheduler.refresh_now();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view. Opening the alerts view marks them viewed.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        if view == View::Alerts {
            self.session.mark_viewed();
        }
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        if self.current_view == View::Alerts {
            let max = self.store.len().saturating_sub(1);
            self.selected_alert_index = (self.selected_alert_index + n).min(max);
        }
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        if self.current_view == View::Alerts {
            self.selected_alert_index = self.selected_alert_index.saturating_sub(n);
        }
    }

    pub fn select_first(&mut self) {
        self.selected_alert_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_alert_index = self.store.len().saturating_sub(1);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Submit the form's measurement to the source.
    ///
    /// Blocks the UI thread for at most the fetch timeout.
    pub fn submit_blood_pressure(&mut self) -> Result<BloodPressure> {
        let measurement = self.bp_form.measurement()?;
        let source = self.source.clone();
        let timeout = self.submit_timeout;

        let outcome = self
            .runtime
            .block_on(async move { tokio::time::timeout(timeout, source.submit(&measurement)).await });

        match outcome {
            Ok(Ok(())) => {
                tracing::info!(%measurement, source = self.source.description(), "manual entry submitted");
                self.scheduler.refresh_now();
                Ok(measurement)
            }
            Ok(Err(e)) => bail!("Submission failed: {}", e),
            Err(_) => bail!("Submission timed out after {}", crate::data::duration::format_duration(timeout)),
        }
    }

    /// Submit and report the outcome in the status bar.
    pub fn submit_and_report(&mut self) {
        match self.submit_blood_pressure() {
            Ok(measurement) => {
                self.set_status_message(format!("Blood pressure {} recorded", measurement));
            }
            Err(e) => {
                tracing::warn!(error = %e, "manual entry rejected");
                self.set_status_message(e.to_string());
            }
        }
    }

    /// Export the readings of the latest frame as CSV.
    pub fn export_readings(&self) -> Result<usize> {
        let Some(ref frame) = self.frame else {
            bail!("No data to export");
        };
        crate::export::export_to_file(&self.export_path, &frame.readings)?;
        Ok(frame.readings.len())
    }

    /// Export and report the outcome in the status bar.
    pub fn export_and_report(&mut self) {
        match self.export_readings() {
            Ok(rows) => {
                let message = format!("Exported {} readings to {}", rows, self.export_path.display());
                self.set_status_message(message);
            }
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
    }

    /// Stop the refresh loop, consuming the app.
    pub fn into_scheduler(self) -> SchedulerHandle {
        self.scheduler
    }
}

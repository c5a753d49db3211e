//! Layered settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, then `VITALWATCH_*` environment variables (`__` separates nested
//! keys, e.g. `VITALWATCH_ALERTS__PATH`). CLI flags are applied on top by
//! the binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;
use vitalwatch_adapters::{CsvSource, DocumentSource, VitalsSource};

use crate::data::connectivity::DEFAULT_OFFLINE_AFTER;
use crate::data::duration::serde_duration;
use crate::data::Thresholds;
use crate::pipeline::{PipelineSettings, DEFAULT_FETCH_TIMEOUT};
use crate::scheduler::DEFAULT_REFRESH;

/// Default settings file, read only if present.
pub const DEFAULT_CONFIG_FILE: &str = "vitalwatch.toml";

/// Default HTTP endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

/// Which backend supplies readings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    /// Spreadsheet export.
    Csv { path: PathBuf },
    /// Newline-delimited JSON document collection.
    Document { path: PathBuf },
    /// REST API.
    Http {
        #[serde(default = "default_endpoint")]
        endpoint: String,
        #[serde(default = "default_fetch_timeout", deserialize_with = "serde_duration::deserialize")]
        timeout: Duration,
    },
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::Csv {
            path: PathBuf::from("vitals.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub path: PathBuf,
    /// Skip re-logging the same kind within this window. Off when unset.
    #[serde(deserialize_with = "serde_duration::option::deserialize")]
    pub suppress_for: Option<Duration>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("alerts.csv"),
            suppress_for: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file used while the terminal UI owns the screen.
    pub file: PathBuf,
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("vitalwatch.log"),
            level: "info".to_string(),
        }
    }
}

/// Top-level settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    #[serde(deserialize_with = "serde_duration::deserialize")]
    pub refresh: Duration,
    #[serde(deserialize_with = "serde_duration::deserialize")]
    pub offline_after: Duration,
    #[serde(deserialize_with = "serde_duration::deserialize")]
    pub fetch_timeout: Duration,
    /// Number of recent readings shown in trends.
    pub window: usize,
    pub alerts: AlertSettings,
    pub thresholds: Thresholds,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: SourceSettings::default(),
            refresh: DEFAULT_REFRESH,
            offline_after: DEFAULT_OFFLINE_AFTER,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            window: 5,
            alerts: AlertSettings::default(),
            thresholds: Thresholds::default(),
            log: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if it exists) and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("VITALWATCH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        let settings: Settings = config.try_deserialize().context("Invalid settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the refresh loop cannot run with.
    ///
    /// Called by [`Settings::load`]; call again after applying overrides.
    pub fn validate(&self) -> Result<()> {
        let mut intervals = vec![
            ("refresh", self.refresh),
            ("offline_after", self.offline_after),
            ("fetch_timeout", self.fetch_timeout),
        ];
        if let SourceSettings::Http { timeout, .. } = &self.source {
            intervals.push(("source.timeout", *timeout));
        }
        for (name, value) in intervals {
            if value.is_zero() {
                bail!("Invalid settings: {} must be greater than zero", name);
            }
        }

        self.thresholds
            .validate()
            .context("Invalid settings: thresholds")
    }

    pub fn pipeline(&self) -> PipelineSettings {
        PipelineSettings {
            thresholds: self.thresholds.clone(),
            offline_after: self.offline_after,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_fetch_timeout() -> Duration {
    DEFAULT_FETCH_TIMEOUT
}

/// Construct the configured backend.
pub fn build_source(settings: &SourceSettings) -> Result<Arc<dyn VitalsSource>> {
    match settings {
        SourceSettings::Csv { path } => Ok(Arc::new(CsvSource::new(path))),
        SourceSettings::Document { path } => Ok(Arc::new(DocumentSource::new(path))),
        #[cfg(feature = "http")]
        SourceSettings::Http { endpoint, timeout } => {
            let source = vitalwatch_adapters::http::HttpSource::builder()
                .endpoint(endpoint.as_str())
                .timeout(*timeout)
                .build()?;
            Ok(Arc::new(source))
        }
        #[cfg(not(feature = "http"))]
        SourceSettings::Http { .. } => {
            anyhow::bail!("HTTP sources need the `http` feature")
        }
    }
}

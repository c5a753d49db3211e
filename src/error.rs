//! Error taxonomy for the evaluation pipeline.

use thiserror::Error;
use vitalwatch_adapters::AdapterError;

use crate::alerts::PersistenceError;

/// Errors raised while turning a poll into alert decisions.
///
/// None of these abort the refresh loop; the pipeline converts them into
/// [`Notice`](crate::pipeline::Notice)s for the dashboard.
#[derive(Debug, Error)]
pub enum Error {
    /// The fetched batch has a missing or unparsable timestamp column.
    #[error("Malformed source data: {0}")]
    MalformedSourceData(String),

    /// The backend could not be reached or read.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(#[from] AdapterError),

    /// An alert could not be written to the alert log.
    #[error("Alert log write failed: {0}")]
    Persistence(#[from] PersistenceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

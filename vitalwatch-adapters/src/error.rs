//! Error types for adapters.

use thiserror::Error;

/// Errors that can occur when fetching from or submitting to a backend.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse the backend's payload.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the backend.
    #[error("Request timed out")]
    Timeout,

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend answered but refused the request.
    #[error("Backend rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Operation not supported by this backend.
    #[error("Feature not supported: {0}")]
    Unsupported(String),
}

impl From<csv::Error> for AdapterError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => AdapterError::Io(io),
                other => AdapterError::Parse(format!("{:?}", other)),
            }
        } else {
            AdapterError::Parse(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Parse(err.to_string())
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

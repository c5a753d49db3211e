//! REST API backend.
//!
//! Talks to a vitals API exposing a single `/data` resource:
//!
//! - `GET  {endpoint}/data` returns every reading, either as a JSON array of
//!   objects or as CSV text with a header row
//! - `POST {endpoint}/data` stores a reading sent as a JSON object
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use vitalwatch_adapters::http::HttpSource;
//! use vitalwatch_adapters::VitalsSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpSource::builder()
//!         .endpoint("http://localhost:5000")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let rows = source.fetch().await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use vitalwatch_types::BloodPressure;

use crate::spreadsheet::parse_records;
use crate::{AdapterError, RawRecord, VitalsSource};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST API source for vitals.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// Returns the API base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn data_url(&self) -> String {
        format!("{}/data", self.endpoint)
    }
}

/// Body posted for a manual entry.
#[derive(Debug, Serialize)]
struct ManualEntryPayload {
    temperature: Option<f64>,
    blood_oxygen: Option<f64>,
    heart_rate: Option<f64>,
    respiration_rate: Option<f64>,
    blood_pressure: String,
}

impl From<&BloodPressure> for ManualEntryPayload {
    fn from(measurement: &BloodPressure) -> Self {
        Self {
            temperature: None,
            blood_oxygen: None,
            heart_rate: None,
            respiration_rate: None,
            blood_pressure: measurement.to_string(),
        }
    }
}

/// Decode a `/data` body, choosing JSON or CSV from the content type.
///
/// Without a usable content type, a body starting with `[` is treated as JSON.
fn decode_body(content_type: Option<&str>, body: &str) -> Result<Vec<RawRecord>, AdapterError> {
    let is_json = match content_type {
        Some(ct) if ct.contains("json") => true,
        Some(ct) if ct.contains("csv") => false,
        _ => body.trim_start().starts_with('['),
    };

    if !is_json {
        return parse_records(body.as_bytes());
    }

    let values: Vec<serde_json::Value> = serde_json::from_str(body)?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            RawRecord::from_json(value)
                .ok_or_else(|| AdapterError::Parse(format!("item {}: expected a JSON object", index)))
        })
        .collect()
}

#[async_trait::async_trait]
impl VitalsSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, AdapterError> {
        let response = self.client.get(self.data_url()).send().await?;

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        decode_body(content_type.as_deref(), &body)
    }

    async fn submit(&self, measurement: &BloodPressure) -> Result<(), AdapterError> {
        let response = self
            .client
            .post(self.data_url())
            .json(&ManualEntryPayload::from(measurement))
            .send()
            .await?;

        // The API signals a stored reading with exactly 200.
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdapterError::Rejected { status, body });
        }

        tracing::debug!(endpoint = %self.endpoint, %measurement, "posted manual entry");
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpSource.
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the API base URL (e.g., "http://localhost:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, AdapterError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Http(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpSource {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawField;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_builder_defaults() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(source.endpoint(), "http://localhost:5000");
        assert_eq!(source.description(), "http: http://localhost:5000");
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let source = HttpSource::builder().endpoint("https://vitals.example/").build().unwrap();
        assert_eq!(source.data_url(), "https://vitals.example/data");
    }

    #[test]
    fn test_decode_body_sniffs_json() {
        let records = decode_body(None, r#"[{"timestamp":"2024-01-01T00:00:00Z","heart_rate":72}]"#)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("heart_rate"), Some(&RawField::Number(72.0)));

        let records = decode_body(Some("text/csv"), "Timestamp,Heart Rate\n2024-01-01T00:00:00Z,72\n")
            .unwrap();
        assert_eq!(records[0].get("Heart Rate"), Some(&RawField::Text("72".to_string())));
    }

    #[test]
    fn test_decode_body_rejects_non_objects() {
        let err = decode_body(Some("application/json"), "[1]").unwrap_err();
        assert!(matches!(err, AdapterError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"timestamp": "2024-01-01T00:00:00Z", "temperature": 36.8},
                {"timestamp": "2024-01-01T00:00:10Z", "temperature": null}
            ])))
            .mount(&server)
            .await;

        let source = HttpSource::builder().endpoint(server.uri()).build().unwrap();
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("temperature"), Some(&RawField::Null));
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpSource::builder().endpoint(server.uri()).build().unwrap();
        assert!(matches!(source.fetch().await, Err(AdapterError::Http(_))));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let source = HttpSource::builder()
            .endpoint(server.uri())
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        assert!(matches!(source.fetch().await, Err(AdapterError::Timeout)));
    }

    #[tokio::test]
    async fn test_submit_posts_partial_reading() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data"))
            .and(body_json(serde_json::json!({
                "temperature": null,
                "blood_oxygen": null,
                "heart_rate": null,
                "respiration_rate": null,
                "blood_pressure": "125/82"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpSource::builder().endpoint(server.uri()).build().unwrap();
        source.submit(&BloodPressure::new(125, 82).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid payload"))
            .mount(&server)
            .await;

        let source = HttpSource::builder().endpoint(server.uri()).build().unwrap();
        let err = source.submit(&BloodPressure::new(125, 82).unwrap()).await.unwrap_err();
        match err {
            AdapterError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid payload");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

//! Statistics API Client
//!
//! HTTP client for the monthly accident statistics endpoint.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::data::AccidentDataByMonth;

/// Source of monthly accident payloads
#[async_trait]
pub trait MonthlySource: Send + Sync {
    /// Fetch and decode the payload served at `url`
    async fn fetch(&self, url: &str) -> Result<AccidentDataByMonth, FetchError>;
}

/// `MonthlySource` backed by plain HTTP GET requests
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// Create a source whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MonthlySource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<AccidentDataByMonth, FetchError> {
        tracing::debug!(%url, "Fetching monthly statistics");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(FetchError::from_transport)?;
        let data: AccidentDataByMonth =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::debug!(
            %url,
            accidents = data.accidents.len(),
            deaths = data.deaths.len(),
            "Fetched monthly statistics"
        );

        Ok(data)
    }
}

/// Errors that can occur while fetching a payload
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Statistics API unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Network(reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Malformed payload: {0}")]
    Decode(String),
}

impl FetchError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Unavailable
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Network(e)
        }
    }

    /// Whether the payload arrived but could not be decoded
    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

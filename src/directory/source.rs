//! Authoritative sources for the clinic directory

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::data::{default_records, DirectoryRecord};

/// Errors that can occur when fetching the directory
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Directory source returned status {0}")]
    Status(StatusCode),

    /// Failed to parse the response body
    #[error("Failed to parse directory response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Source answered with no records
    #[error("Directory source returned no records")]
    Empty,

    /// Fetch did not finish within the configured timeout
    #[error("Directory fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Where fresh directory data comes from
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<DirectoryRecord>, FetchError>;
}

/// Serves the bundled clinic records after a simulated round trip
#[derive(Debug, Clone)]
pub struct BundledSource {
    latency: Duration,
}

impl BundledSource {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for BundledSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

#[async_trait]
impl DirectorySource for BundledSource {
    async fn fetch(&self) -> Result<Vec<DirectoryRecord>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(default_records())
    }
}

/// Fetches the directory as a JSON array of records over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// HTTP client for making requests
    http_client: Client,
    /// Endpoint returning the record array
    url: String,
}

impl HttpSource {
    /// Creates a new HttpSource for the given endpoint
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Creates a new HttpSource with a custom HTTP client
    pub fn with_client(http_client: Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl DirectorySource for HttpSource {
    async fn fetch(&self) -> Result<Vec<DirectoryRecord>, FetchError> {
        let response = self.http_client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = response.text().await?;
        parse_records(&text)
    }
}

/// Parses a directory payload
pub fn parse_records(text: &str) -> Result<Vec<DirectoryRecord>, FetchError> {
    let records: Vec<DirectoryRecord> = serde_json::from_str(text)?;
    if records.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(records)
}

//! Remote page fetching for link previews.

use crate::app_config::PreviewConfig;
use async_trait::async_trait;
use std::time::Duration;

/// Why a page could not be fetched. Never leaves the preview module.
#[derive(Debug)]
pub enum FetchError {
    /// Connection failure, timeout, TLS or redirect error
    Network(reqwest::Error),
    /// Server answered with a non-2xx status
    Status(u16),
    /// Body could not be read as text
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::Status(code) => write!(f, "Unexpected status: {}", code),
            FetchError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(e)
    }
}

/// Retrieves the HTML body behind a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Perform a single GET. No retries.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher with a fixed timeout and user agent.
///
/// Redirects follow reqwest's default policy.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &PreviewConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

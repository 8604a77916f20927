//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror, including:
//! - Building HTTP clients with a fixed request timeout
//! - Sending the identifying user agent (default or per-call override)
//! - Treating anything other than `200 OK` as a hard failure
//! - Error classification

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Generic crawler identity used when nothing else is configured
pub const DEFAULT_USER_AGENT: &str = "Crawler";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while fetching a URL
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with anything other than 200
    #[error("status code is not ok for {url}, but: {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// Request exceeded the configured timeout
    #[error("request timeout for {url}")]
    Timeout { url: String },

    /// DNS, connect, TLS, body read and other transport failures
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Performs a single GET and returns the payload
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, identifying as `user_agent` when given, otherwise as
    /// the fetcher's default identity
    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<String, FetchError>;

    /// Fetches `url` with the default identity
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.get(url, None).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Whole-request timeout applied to every call
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Creates a fetcher with the default identity and timeout
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }

    /// Creates a fetcher with a custom identity and timeout
    pub fn with_settings(
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(timeout)?,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<String, FetchError> {
        let user_agent = user_agent
            .filter(|ua| !ua.is_empty())
            .unwrap_or(self.user_agent.as_str());

        tracing::debug!(url, user_agent, "GET");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

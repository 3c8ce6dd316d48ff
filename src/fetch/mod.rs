//! HTTP page fetching
//!
//! This module performs the single network operation the engine needs:
//! URL in, raw bytes out. Failures are classified into transient errors
//! (worth retrying the whole task) and fatal ones (the task is abandoned).

use crate::config::FetchSettings;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out for {url}")]
    Timeout { url: String },

    #[error("connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// Whether retrying the same request later is likely to succeed
    ///
    /// Network-layer failures and server-side statuses (429, 5xx) are
    /// transient; any other HTTP status is final for the fetched page.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. } | Self::Body { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// A blocking "URL in, bytes out" page fetch
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// reqwest-backed fetcher used for real runs
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds an HTTP client with the configured user agent and timeouts
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Maps a reqwest send() error onto the fetch taxonomy
fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

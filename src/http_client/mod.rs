//! Shared HTTP client used for probing and scraping manual archives.
//!
//! Search strategies never talk to reqwest directly; they go through the
//! [`PageFetcher`] trait so the orchestrator can run against a scripted
//! fetcher in tests.

mod response;
mod user_agent;

pub use response::HeadResponse;
pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Errors from a single outbound request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Minimal network surface the search strategies depend on.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issue a HEAD request, following redirects.
    async fn head(&self, url: &str, timeout: Duration) -> Result<HeadResponse, FetchError>;

    /// GET a page and return its body. Non-2xx responses are errors.
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher. Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - None: browser user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(user_agent_config: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// The underlying reqwest client, for callers that need custom requests.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect()
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn head(&self, url: &str, timeout: Duration) -> Result<HeadResponse, FetchError> {
        let response = self.client.head(url).timeout(timeout).send().await?;

        Ok(HeadResponse {
            status: response.status(),
            headers: collect_headers(response.headers()),
        })
    }

    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

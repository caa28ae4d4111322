//! Azure Computer Vision Read API backend.
//!
//! The Read API is asynchronous: the image is POSTed to `read/analyze`, which
//! answers 202 with an `Operation-Location` URL that is polled until the
//! operation succeeds or fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{OcrBackend, OcrError, OcrText};
use crate::config::Settings;

const ENGINE: &str = "Azure Computer Vision";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Subscription key and resource endpoint.
#[derive(Debug, Clone)]
pub struct AzureCredentials {
    pub key: String,
    pub endpoint: String,
}

impl AzureCredentials {
    /// Both values must be present and non-blank.
    pub fn from_parts(key: Option<String>, endpoint: Option<String>) -> Option<Self> {
        let key = key.filter(|k| !k.trim().is_empty())?;
        let endpoint = endpoint.filter(|e| !e.trim().is_empty())?;
        Some(Self {
            key: key.trim().to_string(),
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
        })
    }

    fn analyze_url(&self) -> String {
        format!("{}/vision/v3.2/read/analyze", self.endpoint)
    }
}

#[derive(Debug, Deserialize)]
struct ReadOperation {
    status: String,
    #[serde(rename = "analyzeResult")]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    #[serde(rename = "readResults", default)]
    read_results: Vec<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

/// Interpret one poll response: `Ok(None)` while still running.
fn interpret(operation: ReadOperation) -> Result<Option<String>, OcrError> {
    match operation.status.as_str() {
        "succeeded" => {
            let lines: Vec<String> = operation
                .analyze_result
                .map(|r| r.read_results)
                .unwrap_or_default()
                .into_iter()
                .flat_map(|page| page.lines)
                .map(|line| line.text)
                .collect();

            if lines.is_empty() {
                Err(OcrError::NoText)
            } else {
                Ok(Some(lines.join("\n")))
            }
        }
        "failed" => Err(OcrError::Failed),
        _ => Ok(None),
    }
}

/// Azure Read API client. Without credentials every call fails with
/// [`OcrError::NotConfigured`].
pub struct AzureReadBackend {
    client: Client,
    credentials: Option<AzureCredentials>,
    poll_interval: Duration,
    timeout: Duration,
}

impl AzureReadBackend {
    pub fn new(client: Client, credentials: Option<AzureCredentials>) -> Self {
        Self {
            client,
            credentials,
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }

    /// Backend with credentials, poll interval and deadline taken from
    /// `settings`.
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        Self::new(client, settings.azure_credentials())
            .with_poll_interval(settings.ocr_poll_interval())
            .with_timeout(settings.ocr_timeout())
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overall deadline for submit plus polling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn submit(&self, credentials: &AzureCredentials, image: Vec<u8>) -> Result<String, OcrError> {
        let response = self
            .client
            .post(credentials.analyze_url())
            .header(KEY_HEADER, &credentials.key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() != StatusCode::ACCEPTED {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::Api { status, body });
        }

        response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(OcrError::MissingOperation)
    }
}

#[async_trait]
impl OcrBackend for AzureReadBackend {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn recognize(&self, image: Vec<u8>) -> Result<OcrText, OcrError> {
        let credentials = self.credentials.as_ref().ok_or(OcrError::NotConfigured)?;
        let deadline = Instant::now() + self.timeout;

        info!("Submitting {} byte image to Azure Read API", image.len());
        let operation_url = self.submit(credentials, image).await?;

        loop {
            if Instant::now() + self.poll_interval > deadline {
                return Err(OcrError::Timeout(self.timeout));
            }
            tokio::time::sleep(self.poll_interval).await;

            let response = self
                .client
                .get(&operation_url)
                .header(KEY_HEADER, &credentials.key)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;

            if response.status() != StatusCode::OK {
                debug!("Read operation poll answered {}", response.status());
                continue;
            }

            let operation: ReadOperation = response.json().await?;
            debug!("Read operation status: {}", operation.status);
            if let Some(text) = interpret(operation)? {
                return Ok(OcrText {
                    text,
                    engine: ENGINE.to_string(),
                });
            }
        }
    }
}

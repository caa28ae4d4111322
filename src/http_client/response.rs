//! Response metadata returned by probes.

use std::collections::HashMap;

use reqwest::StatusCode;

/// HEAD response wrapper (no body, just headers).
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: StatusCode,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
}

impl HeadResponse {
    /// Build a response from a status and an optional content type.
    pub fn new(status: StatusCode, content_type: Option<&str>) -> Self {
        let mut headers = HashMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        Self { status, headers }
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// A 2xx response whose content type mentions PDF.
    pub fn is_pdf(&self) -> bool {
        self.is_success()
            && self
                .content_type()
                .map(|ct| ct.to_lowercase().contains("pdf"))
                .unwrap_or(false)
    }
}

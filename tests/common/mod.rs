//! Scripted network double shared by the integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use tmscout::http_client::{FetchError, HeadResponse, PageFetcher};

/// Answers HEAD and GET from fixed tables and records every call.
#[derive(Default)]
pub struct ScriptedFetcher {
    pdfs: Vec<String>,
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pdf(mut self, url: &str) -> Self {
        self.pdfs.push(url.to_string());
        self
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn touched(&self, host: &str) -> bool {
        self.calls().iter().any(|c| c.contains(host))
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn head(&self, url: &str, _timeout: Duration) -> Result<HeadResponse, FetchError> {
        self.calls.lock().unwrap().push(format!("HEAD {}", url));
        if self.pdfs.iter().any(|p| p == url) {
            Ok(HeadResponse::new(StatusCode::OK, Some("application/pdf")))
        } else {
            Ok(HeadResponse::new(StatusCode::NOT_FOUND, Some("text/html")))
        }
    }

    async fn get_text(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(format!("GET {}", url));
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

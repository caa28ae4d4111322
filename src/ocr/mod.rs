//! OCR for nameplate photographs.
//!
//! Recognition is delegated to a remote service behind the [`OcrBackend`]
//! trait. The only production backend is Azure Computer Vision's Read API.

mod azure;

pub use azure::{AzureCredentials, AzureReadBackend};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from an OCR backend.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR is not configured: set AZURE_VISION_KEY and AZURE_VISION_ENDPOINT")]
    NotConfigured,

    #[error("Azure API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Azure API response had no Operation-Location header")]
    MissingOperation,

    #[error("Azure Read API processing failed")]
    Failed,

    #[error("No text detected")]
    NoText,

    #[error("OCR did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Text recognized in one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrText {
    /// Recognized lines joined with `\n`.
    pub text: String,
    /// Name of the engine that produced the text.
    pub engine: String,
}

/// Trait for OCR backends.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Engine name reported to clients.
    fn engine(&self) -> &'static str;

    /// Whether the backend has what it needs to run.
    fn is_available(&self) -> bool;

    /// Recognize text in an encoded image.
    async fn recognize(&self, image: Vec<u8>) -> Result<OcrText, OcrError>;
}

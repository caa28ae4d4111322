//! HTTP API for nameplate extraction and manual search.
//!
//! Provides:
//! - OCR of uploaded nameplate photos
//! - Buffered and streaming manual search
//! - Debug and mapping-table inspection endpoints

mod handlers;
mod routes;

pub use routes::{create_router, MAX_UPLOAD_BYTES};

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Settings;
use crate::http_client::HttpClient;
use crate::mapping::MappingTable;
use crate::ocr::{AzureReadBackend, OcrBackend};
use crate::search::{ManualSearcher, SiteCatalog};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub searcher: ManualSearcher,
    pub ocr: Arc<dyn OcrBackend>,
}

impl AppState {
    pub fn new(searcher: ManualSearcher, ocr: Arc<dyn OcrBackend>) -> Self {
        Self { searcher, ocr }
    }

    /// Wire the production HTTP client, bundled catalog and mapping table,
    /// and the Azure backend.
    ///
    /// Fails when the bundled data is inconsistent.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = HttpClient::new(settings.search.user_agent.as_deref())?;

        let ocr = AzureReadBackend::from_settings(http.inner().clone(), settings);

        let searcher = ManualSearcher::new(
            Arc::new(http),
            Arc::new(SiteCatalog::bundled()?),
            Arc::new(MappingTable::bundled()?),
            settings.search_config(),
        );

        Ok(Self::new(searcher, Arc::new(ocr)))
    }
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    if !state.ocr.is_available() {
        warn!("Azure OCR is not configured; /extract will fail until AZURE_VISION_KEY and AZURE_VISION_ENDPOINT are set");
    }
    info!(
        "{} target sites, {} model mappings",
        state.searcher.catalog().sites().len(),
        state.searcher.mappings().len()
    );

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

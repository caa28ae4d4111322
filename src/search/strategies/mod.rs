//! Per-site search strategies.
//!
//! Each [`SearchMethodConfig`] variant maps to one strategy function. A site
//! runs its methods in order and stops at the first that finds something.

mod direct;
mod google;
mod mediawiki;
mod model;
mod page_crawl;
mod site_search;

pub use model::model_search;

use std::time::Duration;

use tracing::{debug, warn};

use super::catalog::{SearchMethodConfig, SiteDescriptor};
use super::outcome::SiteOutcome;
use super::SearchConfig;
use crate::http_client::PageFetcher;
use crate::identifiers::TmFormats;

/// Everything a strategy needs to search one site for one TM.
pub struct StrategyContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub site: &'a SiteDescriptor,
    pub tm: &'a TmFormats,
    pub config: &'a SearchConfig,
}

impl StrategyContext<'_> {
    /// HEAD a URL and report whether it serves a PDF.
    async fn probe_pdf(&self, url: &str, timeout: Duration) -> bool {
        debug!("Testing {}", url);
        match self.fetcher.head(url, timeout).await {
            Ok(response) => {
                let is_pdf = response.is_pdf();
                if !is_pdf {
                    debug!(
                        "{} answered {} ({})",
                        url,
                        response.status,
                        response.content_type().unwrap_or("no content type")
                    );
                }
                is_pdf
            }
            Err(e) => {
                debug!("Probe failed for {}: {}", url, e);
                false
            }
        }
    }

    /// GET a page body, logging and swallowing failures.
    async fn fetch_page(&self, url: &str, timeout: Duration) -> Option<String> {
        match self.fetcher.get_text(url, timeout).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("{}: failed to fetch {}: {}", self.site.name, url, e);
                None
            }
        }
    }

    /// Lowercased TM segments for substring tests against hrefs.
    fn lower_segments(&self) -> Vec<String> {
        self.tm
            .segments()
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect()
    }

    /// `TM <dashed> - <site>`.
    fn tm_title(&self) -> String {
        format!("TM {} - {}", self.tm.dashed, self.site.name)
    }
}

/// Run a single configured method.
pub async fn run_method(ctx: &StrategyContext<'_>, method: &SearchMethodConfig) -> SiteOutcome {
    match method {
        SearchMethodConfig::DirectPdfPatterns {
            patterns,
            confidence,
        } => direct::direct_patterns(ctx, patterns, *confidence).await,
        SearchMethodConfig::DirectAndSearch {
            patterns,
            search_url,
        } => site_search::direct_and_search(ctx, patterns, search_url).await,
        SearchMethodConfig::SiteSearchOnly {
            search_url,
            google_query,
        } => site_search::site_search_only(ctx, search_url, google_query.as_deref()).await,
        SearchMethodConfig::GoogleSiteSearch { google_query } => {
            google::google_site_search(ctx, google_query)
        }
        SearchMethodConfig::MediaWikiCrawl { search_url } => {
            mediawiki::mediawiki_crawl(ctx, search_url).await
        }
        SearchMethodConfig::PageCrawl { index_pages } => {
            page_crawl::page_crawl(ctx, index_pages).await
        }
    }
}

/// Run a site's methods in order, stopping at the first hit.
pub async fn run_site(ctx: &StrategyContext<'_>) -> SiteOutcome {
    let mut reasons = Vec::new();

    for method in &ctx.site.methods {
        match run_method(ctx, method).await {
            found @ SiteOutcome::Found(_) => return found,
            SiteOutcome::NotFound { reason } => {
                debug!("{} {}: {}", ctx.site.name, method.kind(), reason);
                reasons.push(reason);
            }
        }
    }

    if reasons.is_empty() {
        SiteOutcome::not_found("no search methods configured")
    } else {
        SiteOutcome::not_found(reasons.join("; "))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted fetcher for strategy and orchestrator tests.

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use crate::http_client::{FetchError, HeadResponse, PageFetcher};

    #[derive(Default)]
    pub struct RecordingFetcher {
        heads: HashMap<String, (u16, Option<String>)>,
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer HEAD for `url` with 200 application/pdf.
        pub fn with_pdf(mut self, url: &str) -> Self {
            self.heads
                .insert(url.to_string(), (200, Some("application/pdf".to_string())));
            self
        }

        pub fn with_head(mut self, url: &str, status: u16, content_type: Option<&str>) -> Self {
            self.heads
                .insert(url.to_string(), (status, content_type.map(str::to_string)));
            self
        }

        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        /// Every request made, as `HEAD <url>` or `GET <url>`.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn called(&self, needle: &str) -> bool {
            self.calls().iter().any(|c| c.contains(needle))
        }
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn head(&self, url: &str, _timeout: Duration) -> Result<HeadResponse, FetchError> {
            self.calls.lock().unwrap().push(format!("HEAD {}", url));
            match self.heads.get(url) {
                Some((status, content_type)) => Ok(HeadResponse::new(
                    StatusCode::from_u16(*status).unwrap(),
                    content_type.as_deref(),
                )),
                None => Ok(HeadResponse::new(StatusCode::NOT_FOUND, Some("text/html"))),
            }
        }

        async fn get_text(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(format!("GET {}", url));
            self.pages
                .get(url)
                .cloned()
                .ok_or(FetchError::Status(404))
        }
    }
}

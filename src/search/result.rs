//! Search result types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a result was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    DirectPdf,
    SiteSearch,
    GoogleSiteSearch,
    MediawikiSearch,
    PageCrawl,
    ManualPageCrawl,
    ModelToTmMapping,
    ModelSearch,
    ManualFallback,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectPdf => "direct_pdf",
            Self::SiteSearch => "site_search",
            Self::GoogleSiteSearch => "google_site_search",
            Self::MediawikiSearch => "mediawiki_search",
            Self::PageCrawl => "page_crawl",
            Self::ManualPageCrawl => "manual_page_crawl",
            Self::ModelToTmMapping => "model_to_tm_mapping",
            Self::ModelSearch => "model_search",
            Self::ManualFallback => "manual_fallback",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate manual location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fixed heuristic score, 0 to 100.
    pub confidence: u8,

    pub method: SearchMethod,

    /// Display name of the site that produced the result.
    pub site: String,

    /// The URL was probed and answered 2xx with a PDF content type.
    pub verified: bool,

    /// TM number recovered from the document URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_tm_found: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_suffix: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial_match: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_tm: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapped_tm: Option<String>,
}

impl SearchResult {
    /// Create an unverified result with no provenance.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        confidence: u8,
        method: SearchMethod,
        site: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: None,
            confidence: confidence.min(100),
            method,
            site: site.into(),
            verified: false,
            actual_tm_found: None,
            title_suffix: None,
            partial_match: false,
            original_query: None,
            matched_tm: None,
            mapped_from: None,
            mapped_tm: None,
        }
    }

    /// Mark the result as verified.
    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_actual_tm(mut self, tm: impl Into<String>) -> Self {
        self.actual_tm_found = Some(tm.into());
        self
    }

    /// Record that the document only shares a prefix with the query.
    pub fn with_partial_match(mut self, queried: &str, matched: &str) -> Self {
        self.partial_match = true;
        self.original_query = Some(queried.to_string());
        self.matched_tm = Some(matched.to_string());
        self.title_suffix = Some(format!("Partial match for {}", queried));
        self
    }

    /// Retag a TM-path result as found through the model mapping table.
    pub fn mapped(mut self, model: &str, tm: &str) -> Self {
        self.title = format!("{} (Mapped from {})", self.title, model);
        self.method = SearchMethod::ModelToTmMapping;
        self.mapped_from = Some(model.to_string());
        self.mapped_tm = Some(tm.to_string());
        self
    }

    /// Description shown to clients, falling back to one derived from the
    /// site and method.
    pub fn display_description(&self) -> String {
        let mut description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Found via {} using {} method", self.site, self.method));

        if let (Some(from), Some(tm)) = (&self.mapped_from, &self.mapped_tm) {
            description.push_str(&format!(" (Model {} → TM {})", from, tm));
        }
        description
    }
}

/// Order by verified first, then confidence, keeping discovery order for ties.
pub fn rank(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.verified
            .cmp(&a.verified)
            .then_with(|| b.confidence.cmp(&a.confidence))
    });
}

//! Manual search orchestration.
//!
//! A search walks the site catalog for the TM number first, falls back to
//! the model mapping table, then to a free-text model search, and finally
//! to a single Google link so callers always get something to click.

pub mod catalog;
pub mod events;
pub mod links;
pub mod outcome;
pub mod result;
pub mod strategies;
pub mod template;

pub use catalog::{ModelSearchEndpoint, SearchMethodConfig, SiteCatalog, SiteDescriptor};
pub use events::{SearchEvent, SearchProgress};
pub use outcome::SiteOutcome;
pub use result::{rank, SearchMethod, SearchResult};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::http_client::PageFetcher;
use crate::identifiers::{format_tm, model_variants, TmFormats};
use crate::mapping::MappingTable;
use strategies::{model_search, run_site, StrategyContext};
use template::google_search_url;

/// Errors from the search layer.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please provide TM number or model number")]
    EmptyQuery,

    #[error("{site}: template {template} references unknown placeholder {{{placeholder}}}")]
    Template {
        site: String,
        template: String,
        placeholder: String,
    },
}

impl SearchError {
    pub(crate) fn template(site: &str, template: &str, placeholder: &str) -> Self {
        Self::Template {
            site: site.to_string(),
            template: template.to_string(),
            placeholder: placeholder.to_string(),
        }
    }
}

/// Limits and timeouts for one searcher.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Cap on results for a TM search.
    pub max_results: usize,
    /// Cap on results for each TM tried through the mapping table.
    pub mapped_max_results: usize,
    /// HEAD timeout for templated direct URLs.
    pub probe_timeout: Duration,
    /// HEAD timeout for links found on search pages.
    pub verify_timeout: Duration,
    /// GET timeout for search and index pages.
    pub page_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            mapped_max_results: 3,
            probe_timeout: Duration::from_secs(10),
            verify_timeout: Duration::from_secs(5),
            page_timeout: Duration::from_secs(15),
        }
    }
}

/// What the caller is looking for. Blank fields are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub tm: Option<String>,
    pub model: Option<String>,
}

impl SearchQuery {
    pub fn new(tm: Option<&str>, model: Option<&str>) -> Self {
        let clean = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            tm: clean(tm),
            model: clean(model),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tm.is_none() && self.model.is_none()
    }

    /// The identifier used for the fallback search, TM first.
    pub fn label(&self) -> Option<&str> {
        self.tm.as_deref().or(self.model.as_deref())
    }

    /// Human-readable description of the search plan.
    pub fn strategy(&self) -> &'static str {
        match (&self.tm, &self.model) {
            (Some(_), Some(_)) => "TM priority with partial matching and model backup",
            (Some(_), None) => "TM only with partial matching",
            _ => "Enhanced model search with mapping",
        }
    }
}

/// The Google link returned when nothing else was found.
pub fn manual_fallback(query: &str) -> SearchResult {
    SearchResult::new(
        google_search_url(&format!("{} filetype:pdf", query)),
        format!("Manual Search: {}", query),
        50,
        SearchMethod::ManualFallback,
        "Google Manual Search",
    )
    .with_description(format!(
        "No PDFs found in targeted databases. Click to search Google manually for \"{}\" PDF files.",
        query
    ))
}

/// Runs searches against the site catalog.
#[derive(Clone)]
pub struct ManualSearcher {
    fetcher: Arc<dyn PageFetcher>,
    catalog: Arc<SiteCatalog>,
    mappings: Arc<MappingTable>,
    config: SearchConfig,
}

impl ManualSearcher {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        catalog: Arc<SiteCatalog>,
        mappings: Arc<MappingTable>,
        config: SearchConfig,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            mappings,
            config,
        }
    }

    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Full search: TM, then model mapping, then model text search, then the
    /// manual fallback. Never returns an empty list.
    pub async fn search(
        &self,
        query: &SearchQuery,
        progress: &SearchProgress,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let Some(label) = query.label() else {
            return Err(SearchError::EmptyQuery);
        };
        info!(tm = ?query.tm, model = ?query.model, "Manual search");

        let mut results = Vec::new();

        if let Some(tm) = &query.tm {
            progress.status(format!("Starting TM search: {}", tm)).await;
            results = self
                .run_tm_path(tm, self.config.max_results, progress, None)
                .await;
        }

        if results.is_empty() {
            if let Some(model) = &query.model {
                progress.status(format!("Starting model search: {}", model)).await;
                results = self.run_model_path(model, progress).await;
            }
        }

        if results.is_empty() {
            progress
                .status("No PDFs found in targeted databases")
                .await;
            let fallback = manual_fallback(label);
            progress.result(&fallback).await;
            results.push(fallback);
        }

        rank(&mut results);
        results.truncate(self.config.max_results);
        info!("Search complete: {} result(s)", results.len());
        Ok(results)
    }

    /// Search the catalog for one TM number without the model or fallback
    /// stages.
    pub async fn search_tm(&self, tm: &str, max_results: usize) -> Vec<SearchResult> {
        self.run_tm_path(tm, max_results, &SearchProgress::silent(), None)
            .await
    }

    /// Run every site for a TM with no short-circuit, keyed by site.
    pub async fn probe_sites(&self, formats: &TmFormats) -> Vec<(String, SiteOutcome)> {
        let mut outcomes = Vec::with_capacity(self.catalog.sites().len());
        for site in self.catalog.sites() {
            let ctx = StrategyContext {
                fetcher: self.fetcher.as_ref(),
                site,
                tm: formats,
                config: &self.config,
            };
            outcomes.push((site.key(), run_site(&ctx).await));
        }
        outcomes
    }

    /// Walk sites by priority. `mapping` is `(model, tm)` when this TM came
    /// from the mapping table; results are retagged before they are emitted.
    async fn run_tm_path(
        &self,
        tm: &str,
        max_results: usize,
        progress: &SearchProgress,
        mapping: Option<(&str, &str)>,
    ) -> Vec<SearchResult> {
        let Some(formats) = format_tm(tm) else {
            debug!("Ignoring unparseable TM {:?}", tm);
            return Vec::new();
        };

        let mut results: Vec<SearchResult> = Vec::new();

        for site in self.catalog.sites() {
            if results.len() >= max_results {
                break;
            }
            if site.skip_when_results_found && !results.is_empty() {
                progress
                    .status(format!(
                        "Skipping {} - already found {} result(s)",
                        site.name,
                        results.len()
                    ))
                    .await;
                continue;
            }

            progress.status(format!("Searching {}...", site.name)).await;

            let ctx = StrategyContext {
                fetcher: self.fetcher.as_ref(),
                site,
                tm: &formats,
                config: &self.config,
            };

            match run_site(&ctx).await {
                SiteOutcome::Found(found) => {
                    let found: Vec<SearchResult> = match mapping {
                        Some((model, mapped_tm)) => found
                            .into_iter()
                            .map(|r| r.mapped(model, mapped_tm))
                            .collect(),
                        None => found,
                    };
                    for result in &found {
                        progress.result(result).await;
                    }
                    progress
                        .status(format!("Found {} result(s) on {}", found.len(), site.name))
                        .await;

                    let verified = found.iter().any(|r| r.verified);
                    results.extend(found);
                    if verified {
                        info!("{}: verified PDF found, stopping", site.name);
                        break;
                    }
                }
                SiteOutcome::NotFound { reason } => {
                    debug!("{}: {}", site.name, reason);
                    progress
                        .status(format!("No exact match on {}", site.name))
                        .await;
                }
            }
        }

        rank(&mut results);
        results.truncate(max_results);
        results
    }

    async fn run_model_path(&self, model: &str, progress: &SearchProgress) -> Vec<SearchResult> {
        let candidates = self.mappings.lookup(model);

        if candidates.is_empty() {
            progress
                .status(format!(
                    "No mapping found for {}, trying direct search...",
                    model
                ))
                .await;
        } else {
            progress
                .status(format!(
                    "Found mapping: {} → {}",
                    model,
                    candidates.join(", ")
                ))
                .await;

            for tm in &candidates {
                progress.status(format!("Searching mapped TM: {}", tm)).await;
                let results = self
                    .run_tm_path(
                        tm,
                        self.config.mapped_max_results,
                        progress,
                        Some((model, tm)),
                    )
                    .await;
                if !results.is_empty() {
                    return results;
                }
            }
        }

        let variants = model_variants(model);
        match model_search(
            self.fetcher.as_ref(),
            self.catalog.model_search(),
            model,
            &variants,
            self.config.page_timeout,
        )
        .await
        {
            Some(result) => {
                progress.result(&result).await;
                vec![result]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::strategies::testing::RecordingFetcher;
    use tokio::sync::mpsc;

    fn searcher_with(fetcher: Arc<RecordingFetcher>, catalog: SiteCatalog) -> ManualSearcher {
        ManualSearcher::new(
            fetcher,
            Arc::new(catalog),
            Arc::new(MappingTable::bundled().unwrap()),
            SearchConfig::default(),
        )
    }

    fn bundled(fetcher: Arc<RecordingFetcher>) -> ManualSearcher {
        searcher_with(fetcher, SiteCatalog::bundled().unwrap())
    }

    /// One direct-probe site, no Google fallback anywhere.
    fn probe_only_catalog() -> SiteCatalog {
        SiteCatalog::new(
            vec![SiteDescriptor {
                name: "Archive".to_string(),
                domain: "archive.test".to_string(),
                priority: 1,
                skip_when_results_found: false,
                methods: vec![SearchMethodConfig::DirectPdfPatterns {
                    patterns: vec!["https://archive.test/TM-{tm_dashed}.pdf".to_string()],
                    confidence: 95,
                }],
            }],
            ModelSearchEndpoint {
                site: "Archive".to_string(),
                domain: "archive.test".to_string(),
                search_url: "https://archive.test/search?q={query}".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_query_normalization() {
        let query = SearchQuery::new(Some("  "), Some(" MEP-803A "));
        assert_eq!(query.tm, None);
        assert_eq!(query.model.as_deref(), Some("MEP-803A"));
        assert_eq!(query.label(), Some("MEP-803A"));
        assert_eq!(query.strategy(), "Enhanced model search with mapping");
        assert!(SearchQuery::new(None, Some("")).is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let searcher = bundled(Arc::new(RecordingFetcher::new()));
        let err = searcher
            .search(&SearchQuery::default(), &SearchProgress::silent())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_verified_hit_stops_site_walk() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("https://www.liberatedmanuals.com/TM-9-6115-642-10.pdf"),
        );
        let searcher = bundled(fetcher.clone());

        let results = searcher
            .search(
                &SearchQuery::new(Some("9-6115-642-10"), None),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].verified);
        assert_eq!(results[0].method, SearchMethod::DirectPdf);
        assert_eq!(results[0].confidence, 95);
        assert_eq!(
            fetcher.calls(),
            vec!["HEAD https://www.liberatedmanuals.com/TM-9-6115-642-10.pdf"]
        );
    }

    #[tokio::test]
    async fn test_terminal_fallback() {
        let fetcher = Arc::new(RecordingFetcher::new());
        let searcher = searcher_with(fetcher, probe_only_catalog());

        let results = searcher
            .search(
                &SearchQuery::new(Some("1-2345-678-90"), None),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ManualFallback);
        assert!(!results[0].verified);
        assert_eq!(results[0].title, "Manual Search: 1-2345-678-90");
        assert_eq!(results[0].confidence, 50);
        assert_eq!(results[0].site, "Google Manual Search");
    }

    #[tokio::test]
    async fn test_bundled_catalog_unmatched_tm_falls_back() {
        let fetcher = Arc::new(RecordingFetcher::new());
        let searcher = bundled(fetcher.clone());

        let results = searcher
            .search(
                &SearchQuery::new(Some("1-2345-678-90"), None),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ManualFallback);
        assert_eq!(results[0].title, "Manual Search: 1-2345-678-90");
        // every site was tried before giving up
        assert!(fetcher.called("radionerds.com"));
        assert!(!fetcher.called("google.com"));
    }

    #[tokio::test]
    async fn test_bundled_catalog_unmatched_tm_reaches_mapped_tm() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("https://www.liberatedmanuals.com/TM-9-6115-642-10.pdf"),
        );
        let searcher = bundled(fetcher.clone());

        let results = searcher
            .search(
                &SearchQuery::new(Some("1-2345-678-90"), Some("MEP-803A")),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ModelToTmMapping);
        assert_eq!(results[0].mapped_tm.as_deref(), Some("9-6115-642-10"));
        assert!(results[0].verified);
        assert!(fetcher.called("HEAD https://www.liberatedmanuals.com/TM-9-6115-642-10.pdf"));
    }

    #[tokio::test]
    async fn test_partial_page_crawl_match() {
        let fetcher = Arc::new(RecordingFetcher::new().with_page(
            "https://greenmountaingenerators.com/manuals-and-support/",
            r#"<a href="https://greenmountaingenerators.com/wp-content/uploads/TM_9_6115_639_13.pdf">MEP-831A</a>"#,
        ));
        let searcher = bundled(fetcher.clone());

        let results = searcher
            .search(
                &SearchQuery::new(Some("9-6115-639-10"), None),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.method, SearchMethod::ManualPageCrawl);
        assert_eq!(result.actual_tm_found.as_deref(), Some("9-6115-639-13"));
        assert_eq!(result.confidence, 85);
        assert!(!result.verified);
        assert!(result.partial_match);
        // Radio Nerds is skipped once anything was found
        assert!(!fetcher.called("radionerds.com"));
        assert!(fetcher.called("combatindex.com"));
    }

    #[tokio::test]
    async fn test_model_mapping_path() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("https://www.liberatedmanuals.com/TM_9_6115_642_10.pdf"),
        );
        let searcher = bundled(fetcher);

        let results = searcher
            .search(
                &SearchQuery::new(None, Some("MEP-813A")),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.method, SearchMethod::ModelToTmMapping);
        assert_eq!(result.mapped_from.as_deref(), Some("MEP-813A"));
        assert_eq!(result.mapped_tm.as_deref(), Some("9-6115-642-10"));
        assert_eq!(
            result.title,
            "TM 9-6115-642-10 - Liberated Manuals (Mapped from MEP-813A)"
        );
        assert!(result.verified);
    }

    #[tokio::test]
    async fn test_direct_model_search() {
        let fetcher = Arc::new(RecordingFetcher::new().with_page(
            "https://archive.test/search?q=XQ-2000",
            r#"<a href="/docs/XQ-2000.pdf">XQ-2000 manual</a>"#,
        ));
        let searcher = searcher_with(fetcher, probe_only_catalog());

        let results = searcher
            .search(
                &SearchQuery::new(Some("1-2-3-4"), Some("XQ-2000")),
                &SearchProgress::silent(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ModelSearch);
        assert_eq!(results[0].url, "https://archive.test/docs/XQ-2000.pdf");
    }

    #[tokio::test]
    async fn test_mapping_tries_next_candidate() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("https://archive.test/TM-9-2320-280-20.pdf"),
        );
        let searcher = searcher_with(fetcher.clone(), probe_only_catalog());

        let results = searcher
            .search(&SearchQuery::new(None, Some("HMMWV")), &SearchProgress::silent())
            .await
            .unwrap();

        assert_eq!(
            fetcher.calls(),
            vec![
                "HEAD https://archive.test/TM-9-2320-280-10.pdf",
                "HEAD https://archive.test/TM-9-2320-280-20.pdf",
            ]
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ModelToTmMapping);
        assert_eq!(results[0].mapped_from.as_deref(), Some("HMMWV"));
        assert_eq!(results[0].mapped_tm.as_deref(), Some("9-2320-280-20"));
    }

    #[tokio::test]
    async fn test_mapped_tms_empty_runs_model_search() {
        let fetcher = Arc::new(RecordingFetcher::new().with_page(
            "https://archive.test/search?q=HMMWV",
            r#"<a href="/docs/hmmwv-operator.pdf">HMMWV operator manual</a>"#,
        ));
        let searcher = searcher_with(fetcher.clone(), probe_only_catalog());

        let results = searcher
            .search(&SearchQuery::new(None, Some("HMMWV")), &SearchProgress::silent())
            .await
            .unwrap();

        assert_eq!(
            fetcher.calls(),
            vec![
                "HEAD https://archive.test/TM-9-2320-280-10.pdf",
                "HEAD https://archive.test/TM-9-2320-280-20.pdf",
                "GET https://archive.test/search?q=HMMWV",
            ]
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].method, SearchMethod::ModelSearch);
        assert_eq!(results[0].url, "https://archive.test/docs/hmmwv-operator.pdf");
        assert_eq!(results[0].mapped_tm, None);
    }

    #[tokio::test]
    async fn test_events_follow_site_order() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("http://combatindex.com/store/tech_man/Sample/TM_9_6115_642_10.pdf"),
        );
        let searcher = bundled(fetcher);
        let (tx, mut rx) = mpsc::channel(64);

        let results = searcher
            .search(
                &SearchQuery::new(Some("9-6115-642-10"), None),
                &SearchProgress::channel(tx),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);

        let mut statuses = Vec::new();
        let mut result_count = 0;
        while let Some(event) = rx.recv().await {
            match event {
                SearchEvent::Status(message) => statuses.push(message),
                SearchEvent::Result(_) => {
                    result_count += 1;
                    assert_eq!(statuses.last().map(String::as_str), Some("Searching Combat Index..."));
                }
            }
        }

        assert_eq!(result_count, 1);
        assert_eq!(
            statuses,
            vec![
                "Starting TM search: 9-6115-642-10",
                "Searching Liberated Manuals...",
                "No exact match on Liberated Manuals",
                "Searching Green Mountain Generators...",
                "No exact match on Green Mountain Generators",
                "Searching Combat Index...",
                "Found 1 result(s) on Combat Index",
            ]
        );
    }

    #[tokio::test]
    async fn test_probe_sites_runs_every_site() {
        let fetcher = Arc::new(
            RecordingFetcher::new().with_pdf("https://www.liberatedmanuals.com/TM-9-6115-642-10.pdf"),
        );
        let searcher = bundled(fetcher.clone());
        let formats = format_tm("9-6115-642-10").unwrap();

        let outcomes = searcher.probe_sites(&formats).await;
        let keys: Vec<_> = outcomes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "liberated_manuals",
                "green_mountain_generators",
                "combat_index",
                "radio_nerds"
            ]
        );
        assert!(outcomes[0].1.is_found());
        assert!(fetcher.called("radionerds.com"));
    }
}

//! Site descriptors and the bundled catalog of manual archives.

use serde::{Deserialize, Serialize};

use super::template::placeholders;
use super::SearchError;
use crate::identifiers::is_known_variant;

/// One way of searching a site. Each kind carries only the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchMethodConfig {
    /// HEAD-probe templated PDF URLs.
    DirectPdfPatterns { patterns: Vec<String>, confidence: u8 },

    /// Probe templated URLs, then scrape the site's own search page.
    DirectAndSearch {
        patterns: Vec<String>,
        search_url: String,
    },

    /// Scrape the site's search page and verify hits, optionally falling back
    /// to a Google site search link.
    SiteSearchOnly {
        search_url: String,
        google_query: Option<String>,
    },

    /// Emit a Google site search link without touching the site.
    GoogleSiteSearch { google_query: String },

    /// Query a MediaWiki search page and follow wiki pages to PDFs.
    #[serde(rename = "mediawiki_crawl")]
    MediaWikiCrawl { search_url: String },

    /// Scan manuals index pages for PDFs named after TM numbers.
    PageCrawl { index_pages: Vec<String> },
}

impl SearchMethodConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DirectPdfPatterns { .. } => "direct_pdf_patterns",
            Self::DirectAndSearch { .. } => "direct_and_search",
            Self::SiteSearchOnly { .. } => "site_search_only",
            Self::GoogleSiteSearch { .. } => "google_site_search",
            Self::MediaWikiCrawl { .. } => "mediawiki_crawl",
            Self::PageCrawl { .. } => "page_crawl",
        }
    }

    /// Check that every placeholder refers to something the renderer knows.
    fn validate(&self, site: &str) -> Result<(), SearchError> {
        let check_tm = |template: &String| -> Result<(), SearchError> {
            for name in placeholders(template) {
                if !is_known_variant(name) {
                    return Err(SearchError::template(site, template, name));
                }
            }
            Ok(())
        };
        let check_query = |template: &String| -> Result<(), SearchError> {
            for name in placeholders(template) {
                if name != "query" {
                    return Err(SearchError::template(site, template, name));
                }
            }
            Ok(())
        };

        match self {
            Self::DirectPdfPatterns { patterns, .. } => patterns.iter().try_for_each(check_tm),
            Self::DirectAndSearch {
                patterns,
                search_url,
            } => {
                patterns.iter().try_for_each(check_tm)?;
                check_query(search_url)
            }
            Self::SiteSearchOnly {
                search_url,
                google_query,
            } => {
                check_query(search_url)?;
                google_query.iter().try_for_each(check_query)
            }
            Self::GoogleSiteSearch { google_query } => check_query(google_query),
            Self::MediaWikiCrawl { search_url } => check_query(search_url),
            Self::PageCrawl { index_pages } => index_pages.iter().try_for_each(|page| {
                match placeholders(page).first() {
                    Some(name) => Err(SearchError::template(site, page, name)),
                    None => Ok(()),
                }
            }),
        }
    }
}

/// A manual archive and the ordered methods used to search it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    pub domain: String,
    /// Lower runs first.
    pub priority: u32,
    /// Skip this site once earlier sites produced any result.
    #[serde(default)]
    pub skip_when_results_found: bool,
    pub methods: Vec<SearchMethodConfig>,
}

impl SiteDescriptor {
    /// Snake-case key used in debug output (`liberated_manuals`).
    pub fn key(&self) -> String {
        self.name
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Free-text endpoint used for the direct model search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSearchEndpoint {
    pub site: String,
    pub domain: String,
    pub search_url: String,
}

/// Validated, priority-ordered set of sites.
#[derive(Debug, Clone)]
pub struct SiteCatalog {
    sites: Vec<SiteDescriptor>,
    model_search: ModelSearchEndpoint,
}

impl SiteCatalog {
    /// Build a catalog, sorting by priority and rejecting bad templates.
    pub fn new(
        mut sites: Vec<SiteDescriptor>,
        model_search: ModelSearchEndpoint,
    ) -> Result<Self, SearchError> {
        for site in &sites {
            for method in &site.methods {
                method.validate(&site.name)?;
            }
        }
        if let Some(name) = placeholders(&model_search.search_url)
            .into_iter()
            .find(|name| *name != "query")
        {
            return Err(SearchError::template(
                &model_search.site,
                &model_search.search_url,
                name,
            ));
        }

        sites.sort_by_key(|site| site.priority);
        Ok(Self {
            sites,
            model_search,
        })
    }

    /// The archives searched by default.
    pub fn bundled() -> Result<Self, SearchError> {
        let sites = vec![
            SiteDescriptor {
                name: "Liberated Manuals".to_string(),
                domain: "www.liberatedmanuals.com".to_string(),
                priority: 1,
                skip_when_results_found: false,
                methods: vec![SearchMethodConfig::DirectPdfPatterns {
                    patterns: strings(&[
                        "https://www.liberatedmanuals.com/TM-{tm_dashed}.pdf",
                        "https://www.liberatedmanuals.com/TM_{tm_underscore}.pdf",
                        "https://www.liberatedmanuals.com/{tm_dashed}.pdf",
                    ]),
                    confidence: 95,
                }],
            },
            SiteDescriptor {
                name: "Green Mountain Generators".to_string(),
                domain: "greenmountaingenerators.com".to_string(),
                priority: 2,
                skip_when_results_found: false,
                methods: vec![
                    SearchMethodConfig::PageCrawl {
                        index_pages: strings(&["https://greenmountaingenerators.com/manuals-and-support/"]),
                    },
                    SearchMethodConfig::DirectAndSearch {
                        patterns: strings(&[
                            "https://greenmountaingenerators.com/wp-content/uploads/2012/10/MEP-003A-Unit-Direct-Support-General-Support-and-Depot-Level-Maintenance-Repair-Parts-and-Special-Tools-List-TM-{tm_dashed}.pdf",
                            "https://greenmountaingenerators.com/manuals/TM-{tm_dashed}.pdf",
                        ]),
                        search_url: "https://greenmountaingenerators.com/?s={query}".to_string(),
                    },
                ],
            },
            SiteDescriptor {
                name: "Combat Index".to_string(),
                domain: "combatindex.com".to_string(),
                priority: 3,
                skip_when_results_found: false,
                methods: vec![SearchMethodConfig::DirectPdfPatterns {
                    patterns: strings(&[
                        "http://combatindex.com/store/tech_man/Sample/Generators/TM_{tm_underscore}.pdf",
                        "http://combatindex.com/store/tech_man/Sample/Generators/TM_{tm_dashed}.pdf",
                        "https://combatindex.com/store/tech_man/Sample/Generators/TM_{tm_underscore}.pdf",
                        "https://combatindex.com/store/tech_man/Sample/Generators/TM_{tm_dashed}.pdf",
                        "http://combatindex.com/store/tech_man/Sample/TM_{tm_underscore}.pdf",
                    ]),
                    confidence: 90,
                }],
            },
            SiteDescriptor {
                name: "Radio Nerds".to_string(),
                domain: "radionerds.com".to_string(),
                priority: 4,
                skip_when_results_found: true,
                methods: vec![
                    SearchMethodConfig::MediaWikiCrawl {
                        search_url: "https://radionerds.com/index.php?search={query}&title=Special:Search"
                            .to_string(),
                    },
                    SearchMethodConfig::SiteSearchOnly {
                        search_url:
                            "https://radionerds.com/index.php?search={query}&title=Special:Search&go=Go"
                                .to_string(),
                        google_query: None,
                    },
                ],
            },
        ];

        let model_search = ModelSearchEndpoint {
            site: "Liberated Manuals".to_string(),
            domain: "www.liberatedmanuals.com".to_string(),
            search_url: "https://www.liberatedmanuals.com/search?q={query}".to_string(),
        };

        Self::new(sites, model_search)
    }

    /// Sites in ascending priority order.
    pub fn sites(&self) -> &[SiteDescriptor] {
        &self.sites
    }

    pub fn site_names(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn model_search(&self) -> &ModelSearchEndpoint {
        &self.model_search
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

//! Scraping a site's own search results page.

use tracing::info;

use super::{direct, google, StrategyContext};
use crate::search::links::{absolutize, anchors, Anchor};
use crate::search::outcome::SiteOutcome;
use crate::search::result::{SearchMethod, SearchResult};
use crate::search::template::render_query;

/// A PDF link that mentions "tm" and shares at least one segment with the TM.
fn is_candidate(anchor: &Anchor, segments: &[String]) -> bool {
    let href = anchor.href_lower();
    anchor.is_pdf()
        && (anchor.text_lower().contains("tm") || href.contains("tm"))
        && segments.iter().any(|s| href.contains(s.as_str()))
}

/// Fetch the search page for `TM <dashed>` and return absolute candidate URLs.
async fn candidate_links(ctx: &StrategyContext<'_>, search_url: &str) -> Option<Vec<String>> {
    let url = render_query(search_url, &format!("TM {}", ctx.tm.dashed));
    let html = ctx.fetch_page(&url, ctx.config.page_timeout).await?;
    let segments = ctx.lower_segments();

    Some(
        anchors(&html)
            .iter()
            .filter(|anchor| is_candidate(anchor, &segments))
            .map(|anchor| absolutize(&ctx.site.domain, &anchor.href))
            .collect(),
    )
}

pub(super) async fn direct_and_search(
    ctx: &StrategyContext<'_>,
    patterns: &[String],
    search_url: &str,
) -> SiteOutcome {
    if let Some(hit) = direct::first_pdf(ctx, patterns, 92).await {
        return SiteOutcome::Found(vec![hit]);
    }

    let Some(links) = candidate_links(ctx, search_url).await else {
        return SiteOutcome::not_found("search page unavailable");
    };

    match links.into_iter().next() {
        Some(url) => {
            info!("{}: found via site search: {}", ctx.site.name, url);
            SiteOutcome::Found(vec![SearchResult::new(
                url,
                ctx.tm_title(),
                85,
                SearchMethod::SiteSearch,
                &ctx.site.name,
            )])
        }
        None => SiteOutcome::not_found("no direct PDF and no matching search links"),
    }
}

pub(super) async fn site_search_only(
    ctx: &StrategyContext<'_>,
    search_url: &str,
    google_query: Option<&str>,
) -> SiteOutcome {
    let links = candidate_links(ctx, search_url).await.unwrap_or_default();

    for url in links {
        if ctx.probe_pdf(&url, ctx.config.verify_timeout).await {
            info!("{}: found and verified: {}", ctx.site.name, url);
            return SiteOutcome::Found(vec![SearchResult::new(
                url,
                ctx.tm_title(),
                88,
                SearchMethod::SiteSearch,
                &ctx.site.name,
            )
            .verified()]);
        }
    }

    match google_query {
        Some(query) => SiteOutcome::Found(vec![google::site_search_link(ctx, query, 75)]),
        None => SiteOutcome::not_found("no verified links on search page"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::format_tm;
    use crate::search::catalog::SiteDescriptor;
    use crate::search::strategies::testing::RecordingFetcher;
    use crate::search::SearchConfig;

    const SEARCH: &str = "https://archive.test/?s={query}";
    const SEARCH_PAGE: &str = "https://archive.test/?s=TM%209-6115-642-10";

    fn site() -> SiteDescriptor {
        SiteDescriptor {
            name: "Archive".to_string(),
            domain: "archive.test".to_string(),
            priority: 1,
            skip_when_results_found: false,
            methods: vec![],
        }
    }

    #[test]
    fn test_is_candidate() {
        let segments: Vec<String> = ["9", "6115", "642", "10"].iter().map(|s| s.to_string()).collect();
        let anchor = |href: &str, text: &str| Anchor {
            href: href.to_string(),
            text: text.to_string(),
        };

        assert!(is_candidate(&anchor("/up/TM-9-6115-642-10.pdf", ""), &segments));
        assert!(is_candidate(&anchor("/up/6115.pdf", "TM manual"), &segments));
        assert!(!is_candidate(&anchor("/up/6115.html", "TM"), &segments));
        assert!(!is_candidate(&anchor("/up/6115.pdf", "manual"), &segments));
        assert!(!is_candidate(&anchor("/up/tm-8-1234.pdf", ""), &segments));
    }

    #[tokio::test]
    async fn test_direct_and_search_falls_back_to_search_page() {
        let fetcher = RecordingFetcher::new().with_page(
            SEARCH_PAGE,
            r#"<a href="/about">About</a><a href="/uploads/TM-9-6115-642-10.pdf">Download</a>"#,
        );
        let site = site();
        let tm = format_tm("9-6115-642-10").unwrap();
        let config = SearchConfig::default();
        let ctx = StrategyContext {
            fetcher: &fetcher,
            site: &site,
            tm: &tm,
            config: &config,
        };

        let patterns = vec!["https://archive.test/manuals/TM-{tm_dashed}.pdf".to_string()];
        let outcome = direct_and_search(&ctx, &patterns, SEARCH).await;
        let results = outcome.results();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://archive.test/uploads/TM-9-6115-642-10.pdf");
        assert_eq!(results[0].method, SearchMethod::SiteSearch);
        assert_eq!(results[0].confidence, 85);
        assert!(!results[0].verified);
    }

    #[tokio::test]
    async fn test_direct_and_search_prefers_direct_hit() {
        let fetcher =
            RecordingFetcher::new().with_pdf("https://archive.test/manuals/TM-9-6115-642-10.pdf");
        let site = site();
        let tm = format_tm("9-6115-642-10").unwrap();
        let config = SearchConfig::default();
        let ctx = StrategyContext {
            fetcher: &fetcher,
            site: &site,
            tm: &tm,
            config: &config,
        };

        let patterns = vec!["https://archive.test/manuals/TM-{tm_dashed}.pdf".to_string()];
        let results = direct_and_search(&ctx, &patterns, SEARCH).await.into_results();

        assert_eq!(results[0].confidence, 92);
        assert!(results[0].verified);
        assert!(!fetcher.called("GET"));
    }

    #[tokio::test]
    async fn test_site_search_only_verifies_links() {
        let fetcher = RecordingFetcher::new()
            .with_page(
                SEARCH_PAGE,
                r#"<a href="https://cdn.test/TM_9_6115_642_10.pdf">TM</a>"#,
            )
            .with_pdf("https://cdn.test/TM_9_6115_642_10.pdf");
        let site = site();
        let tm = format_tm("9-6115-642-10").unwrap();
        let config = SearchConfig::default();
        let ctx = StrategyContext {
            fetcher: &fetcher,
            site: &site,
            tm: &tm,
            config: &config,
        };

        let results = site_search_only(&ctx, SEARCH, None).await.into_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].confidence, 88);
        assert!(results[0].verified);
    }

    #[tokio::test]
    async fn test_site_search_only_google_fallback() {
        let fetcher = RecordingFetcher::new();
        let site = site();
        let tm = format_tm("9-6115-642-10").unwrap();
        let config = SearchConfig::default();
        let ctx = StrategyContext {
            fetcher: &fetcher,
            site: &site,
            tm: &tm,
            config: &config,
        };

        let results = site_search_only(&ctx, SEARCH, Some(r#"site:archive.test "{query}" filetype:pdf"#))
            .await
            .into_results();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.method, SearchMethod::GoogleSiteSearch);
        assert_eq!(result.confidence, 75);
        assert_eq!(result.site, "Archive (via Google)");
        assert!(!result.verified);
        assert!(result
            .url
            .starts_with("https://www.google.com/search?q=site%3Aarchive.test"));

        let none = site_search_only(&ctx, SEARCH, None).await;
        assert!(!none.is_found());
    }
}

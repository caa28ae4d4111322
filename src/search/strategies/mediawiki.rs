//! MediaWiki search with a one-hop crawl of matching wiki pages.

use std::collections::HashSet;

use tracing::info;

use super::StrategyContext;
use crate::identifiers::extract_tm_from_url;
use crate::search::links::{absolutize, anchors, segment_hits};
use crate::search::outcome::SiteOutcome;
use crate::search::result::{SearchMethod, SearchResult};
use crate::search::template::render_query;

/// Segments an href or link text must share with the TM.
const MIN_SEGMENT_HITS: usize = 3;

pub(super) async fn mediawiki_crawl(ctx: &StrategyContext<'_>, search_url: &str) -> SiteOutcome {
    let dashed = &ctx.tm.dashed;
    let queries = [
        dashed.clone(),
        format!("TM {}", dashed),
        format!("TM-{}", dashed),
        ctx.tm.spaced.clone(),
    ];
    let segments = ctx.lower_segments();
    let mut crawled = HashSet::new();

    for query in &queries {
        let url = render_query(search_url, query);
        let Some(html) = ctx.fetch_page(&url, ctx.config.page_timeout).await else {
            continue;
        };

        for anchor in anchors(&html) {
            let href = anchor.href_lower();
            if segment_hits(&segments, &href) < MIN_SEGMENT_HITS
                && segment_hits(&segments, &anchor.text_lower()) < MIN_SEGMENT_HITS
            {
                continue;
            }
            if !(anchor.href.starts_with('/') || anchor.href.starts_with("http")) {
                continue;
            }

            let target = absolutize(&ctx.site.domain, &anchor.href);

            if anchor.is_pdf() {
                if ctx.probe_pdf(&target, ctx.config.verify_timeout).await {
                    info!("{}: found via wiki search: {}", ctx.site.name, target);
                    return SiteOutcome::Found(vec![wiki_result(
                        ctx,
                        target,
                        90,
                        SearchMethod::MediawikiSearch,
                    )]);
                }
            } else if href.contains("index.php") || anchor.text.to_uppercase().contains("MEP") {
                if !crawled.insert(target.clone()) {
                    continue;
                }
                if let Some(result) = crawl_page(ctx, &target, &segments).await {
                    return SiteOutcome::Found(vec![result]);
                }
            }
        }
    }

    SiteOutcome::not_found("no wiki page or PDF matched")
}

/// Look for a verified PDF link on an intermediate wiki page.
async fn crawl_page(
    ctx: &StrategyContext<'_>,
    page_url: &str,
    segments: &[String],
) -> Option<SearchResult> {
    let html = ctx.fetch_page(page_url, ctx.config.probe_timeout).await?;

    for anchor in anchors(&html) {
        if !anchor.is_pdf() || segment_hits(segments, &anchor.href_lower()) < MIN_SEGMENT_HITS {
            continue;
        }

        let target = absolutize(&ctx.site.domain, &anchor.href);
        if ctx.probe_pdf(&target, ctx.config.verify_timeout).await {
            info!("{}: found via page crawl: {}", ctx.site.name, target);
            return Some(wiki_result(ctx, target, 88, SearchMethod::PageCrawl));
        }
    }
    None
}

/// Title and provenance come from the TM in the URL when one is present.
fn wiki_result(
    ctx: &StrategyContext<'_>,
    url: String,
    confidence: u8,
    method: SearchMethod,
) -> SearchResult {
    let actual = extract_tm_from_url(&url).unwrap_or_else(|| ctx.tm.dashed.clone());
    SearchResult::new(
        url,
        format!("TM {} - {}", actual, ctx.site.name),
        confidence,
        method,
        &ctx.site.name,
    )
    .verified()
    .with_actual_tm(actual)
}

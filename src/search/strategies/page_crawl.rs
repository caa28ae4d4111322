//! Manuals index page crawl with prefix matching.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::StrategyContext;
use crate::search::links::{absolutize, anchors};
use crate::search::outcome::SiteOutcome;
use crate::search::result::{SearchMethod, SearchResult};

/// Results kept from one index page.
const MAX_CANDIDATES: usize = 3;

static INDEX_TM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tm[_-]?(\d+)[_-](\d+)[_-](\d+)[_-](\d+[a-z]*)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
enum MatchKind {
    Exact,
    Partial,
}

#[derive(Debug, Clone)]
struct Candidate {
    url: String,
    actual_tm: String,
    kind: MatchKind,
}

/// Classify every PDF link on an index page against the target segments.
fn index_candidates(html: &str, domain: &str, target: &[String]) -> Vec<Candidate> {
    if target.len() < 3 {
        return Vec::new();
    }

    let mut exact = Vec::new();
    let mut partial = Vec::new();

    for anchor in anchors(html) {
        let href = anchor.href_lower();
        if !href.ends_with(".pdf") {
            continue;
        }
        let Some(caps) = INDEX_TM.captures(&href) else {
            continue;
        };
        let found: Vec<&str> = (1..=4)
            .filter_map(|i| caps.get(i).map(|m| m.as_str()))
            .collect();

        let first_three = found[..3] == target[..3];
        let all_four = target.len() >= 4 && found[..4] == target[..4];

        let kind = if all_four {
            MatchKind::Exact
        } else if first_three {
            MatchKind::Partial
        } else {
            continue;
        };

        let url = absolutize(domain, &anchor.href);
        if exact.iter().chain(partial.iter()).any(|c: &Candidate| c.url == url) {
            continue;
        }

        let candidate = Candidate {
            url,
            actual_tm: found.join("-").to_uppercase(),
            kind,
        };
        match candidate.kind {
            MatchKind::Exact => exact.push(candidate),
            MatchKind::Partial => partial.push(candidate),
        }
    }

    exact
        .into_iter()
        .chain(partial)
        .take(MAX_CANDIDATES)
        .collect()
}

pub(super) async fn page_crawl(ctx: &StrategyContext<'_>, index_pages: &[String]) -> SiteOutcome {
    let target = ctx.lower_segments();

    for page in index_pages {
        let Some(html) = ctx.fetch_page(page, ctx.config.page_timeout).await else {
            continue;
        };

        let candidates = index_candidates(&html, &ctx.site.domain, &target);
        if candidates.is_empty() {
            continue;
        }

        info!(
            "{}: {} candidate(s) on {}",
            ctx.site.name,
            candidates.len(),
            page
        );

        let results = candidates
            .into_iter()
            .map(|candidate| {
                let title = format!("TM {}", candidate.actual_tm);
                let result = match candidate.kind {
                    MatchKind::Exact => SearchResult::new(
                        candidate.url,
                        title,
                        95,
                        SearchMethod::ManualPageCrawl,
                        &ctx.site.name,
                    ),
                    MatchKind::Partial => SearchResult::new(
                        candidate.url,
                        title,
                        85,
                        SearchMethod::ManualPageCrawl,
                        &ctx.site.name,
                    )
                    .with_partial_match(&ctx.tm.dashed, &candidate.actual_tm),
                };
                result.with_actual_tm(candidate.actual_tm)
            })
            .collect();

        return SiteOutcome::Found(results);
    }

    SiteOutcome::not_found("no matching PDFs on index pages")
}

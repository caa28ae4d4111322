//! Google site-search pseudo-results.

use super::StrategyContext;
use crate::search::outcome::SiteOutcome;
use crate::search::result::{SearchMethod, SearchResult};
use crate::search::template::{google_search_url, render_raw_query};

/// A link to a Google site search for this TM, never verified.
pub(super) fn site_search_link(
    ctx: &StrategyContext<'_>,
    google_query: &str,
    confidence: u8,
) -> SearchResult {
    let query = render_raw_query(google_query, &format!("TM {}", ctx.tm.dashed));

    SearchResult::new(
        google_search_url(&query),
        format!("Google search: TM {} on {}", ctx.tm.dashed, ctx.site.name),
        confidence,
        SearchMethod::GoogleSiteSearch,
        format!("{} (via Google)", ctx.site.name),
    )
    .with_description("Manual search required: Click to search Google")
}

pub(super) fn google_site_search(ctx: &StrategyContext<'_>, google_query: &str) -> SiteOutcome {
    SiteOutcome::Found(vec![site_search_link(ctx, google_query, 70)])
}

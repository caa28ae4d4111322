//! Templated direct-URL probing.

use tracing::{debug, info};

use super::StrategyContext;
use crate::search::outcome::SiteOutcome;
use crate::search::result::{SearchMethod, SearchResult};
use crate::search::template::render_tm;

/// Probe each rendered template and return the first PDF.
pub(super) async fn first_pdf(
    ctx: &StrategyContext<'_>,
    patterns: &[String],
    confidence: u8,
) -> Option<SearchResult> {
    for template in patterns {
        let Some(url) = render_tm(template, ctx.tm) else {
            debug!("Skipping {}: variant not available for {}", template, ctx.tm.dashed);
            continue;
        };

        if ctx.probe_pdf(&url, ctx.config.probe_timeout).await {
            info!("{}: found PDF at {}", ctx.site.name, url);
            return Some(
                SearchResult::new(
                    url,
                    ctx.tm_title(),
                    confidence,
                    SearchMethod::DirectPdf,
                    &ctx.site.name,
                )
                .verified(),
            );
        }
    }
    None
}

pub(super) async fn direct_patterns(
    ctx: &StrategyContext<'_>,
    patterns: &[String],
    confidence: u8,
) -> SiteOutcome {
    SiteOutcome::from_option(
        first_pdf(ctx, patterns, confidence).await,
        "no direct PDF pattern matched",
    )
}

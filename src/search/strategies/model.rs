//! Free-text model search against the model search endpoint.

use std::time::Duration;

use tracing::{info, warn};

use crate::http_client::PageFetcher;
use crate::search::catalog::ModelSearchEndpoint;
use crate::search::links::{absolutize, anchors};
use crate::search::result::{SearchMethod, SearchResult};
use crate::search::template::render_query;

/// Query the endpoint with each spelling and return the first PDF link that
/// mentions any of them.
pub async fn model_search(
    fetcher: &dyn PageFetcher,
    endpoint: &ModelSearchEndpoint,
    model: &str,
    variants: &[String],
    timeout: Duration,
) -> Option<SearchResult> {
    let needles: Vec<String> = variants.iter().map(|v| v.to_lowercase()).collect();

    for variant in variants {
        let url = render_query(&endpoint.search_url, variant);
        let html = match fetcher.get_text(&url, timeout).await {
            Ok(html) => html,
            Err(e) => {
                warn!("{}: model search failed for {}: {}", endpoint.site, url, e);
                continue;
            }
        };

        for anchor in anchors(&html) {
            let href = anchor.href_lower();
            if !href.ends_with(".pdf") {
                continue;
            }
            let text = anchor.text_lower();
            if needles
                .iter()
                .any(|n| href.contains(n.as_str()) || text.contains(n.as_str()))
            {
                let pdf_url = absolutize(&endpoint.domain, &anchor.href);
                info!("{}: model search hit {}", endpoint.site, pdf_url);
                return Some(SearchResult::new(
                    pdf_url,
                    format!("Manual for {} - {}", model, endpoint.site),
                    80,
                    SearchMethod::ModelSearch,
                    &endpoint.site,
                ));
            }
        }
    }
    None
}

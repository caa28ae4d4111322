//! Status and inspection endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::info;

use super::super::AppState;
use crate::identifiers::format_tm;

/// Service status, feature flags and catalog summary.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let searcher = &state.searcher;
    Json(json!({
        "status": "ok",
        "service": "tmscout manual search",
        "features": {
            "partial_tm_matching": true,
            "model_to_tm_mapping": true,
            "five_segment_tm_support": true,
            "green_mountain_direct_pdf": true,
        },
        "target_sites": searcher.catalog().site_names(),
        "search_strategy": "TM priority with partial matching, enhanced Model backup",
        "model_mappings": searcher.mappings().len(),
        "ocr_configured": state.ocr.is_available(),
    }))
}

/// Dump the mapping table grouped by subset.
pub async fn list_mappings(State(state): State<AppState>) -> impl IntoResponse {
    let table = state.searcher.mappings();

    let mut mappings = Map::new();
    for subset in table.subsets() {
        let entries: Map<String, Value> = subset
            .entries
            .iter()
            .map(|(model, tms)| (model.clone(), json!(tms)))
            .collect();
        mappings.insert(subset.category.to_string(), Value::Object(entries));
    }

    Json(json!({
        "success": true,
        "total_mappings": table.len(),
        "mappings": mappings,
    }))
}

/// Run every site for one TM individually, plus a full TM search.
pub async fn test_tm(
    State(state): State<AppState>,
    Path(tm_number): Path<String>,
) -> Response {
    let Some(formats) = format_tm(&tm_number) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": format!("Invalid TM number: {}", tm_number),
            })),
        )
            .into_response();
    };
    info!("Testing TM search for {}", formats.dashed);

    let searcher = &state.searcher;
    let site_results: Map<String, Value> = searcher
        .probe_sites(&formats)
        .await
        .into_iter()
        .map(|(key, outcome)| (key, json!(outcome.results())))
        .collect();

    let full = searcher.search_tm(&tm_number, searcher.config().max_results).await;

    Json(json!({
        "success": true,
        "tm_number": tm_number,
        "formats": formats.variants(),
        "site_results": site_results,
        "total_found": full.len(),
        "full_search_results": full,
    }))
    .into_response()
}

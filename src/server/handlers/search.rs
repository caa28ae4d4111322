//! Buffered manual search.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use super::super::AppState;
use super::helpers::{bad_request, ResultView, SearchRequest};
use crate::search::{SearchError, SearchProgress, SearchQuery};

/// Parse a search body into a non-empty query, or the 400 to send back.
pub(super) fn parse_query(
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<SearchQuery, Response> {
    let Ok(Json(request)) = payload else {
        return Err(bad_request("No JSON data provided"));
    };
    let query = request.query();
    if query.is_empty() {
        return Err(bad_request(SearchError::EmptyQuery.to_string()));
    }
    Ok(query)
}

/// Run one search and return every result at once.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let query = match parse_query(payload) {
        Ok(q) => q,
        Err(response) => return response,
    };
    let strategy = query.strategy();
    info!(tm = ?query.tm, model = ?query.model, "Search request: {}", strategy);

    match state.searcher.search(&query, &SearchProgress::silent()).await {
        Ok(results) => {
            let results: Vec<ResultView> = results.iter().map(ResultView::from_result).collect();
            Json(json!({
                "success": true,
                "query": {
                    "tm": query.tm,
                    "model": query.model,
                    "strategy": strategy,
                },
                "total": results.len(),
                "results": results,
                "search_method": "enhanced_partial_matching_search",
            }))
            .into_response()
        }
        Err(e) => {
            warn!("Search failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": e.to_string(),
                    "query": {
                        "tm": query.tm,
                        "model": query.model,
                    },
                    "results": [],
                    "total": 0,
                })),
            )
                .into_response()
        }
    }
}

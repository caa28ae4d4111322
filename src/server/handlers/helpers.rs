//! Request and response types shared by the search handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::search::{SearchMethod, SearchQuery, SearchResult};

/// Body of `/search` and `/search-stream-fixed`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub tm: Option<String>,
    pub model: Option<String>,
}

impl SearchRequest {
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.tm.as_deref(), self.model.as_deref())
    }
}

/// A search result as clients see it.
#[derive(Debug, Serialize)]
pub struct ResultView {
    pub title: String,
    pub url: String,
    pub description: String,
    pub confidence: u8,
    pub source: String,
    pub verified: bool,
    pub method: SearchMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_tm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_suffix: Option<String>,

    /// Streamed results only.
    #[serde(rename = "isPdfResult", skip_serializing_if = "Option::is_none")]
    pub is_pdf_result: Option<bool>,
}

impl ResultView {
    pub fn from_result(result: &SearchResult) -> Self {
        let partial = result.partial_match;
        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            description: result.display_description(),
            confidence: result.confidence,
            source: result.site.clone(),
            verified: result.verified,
            method: result.method,
            partial_match: partial.then_some(true),
            original_query: result.original_query.clone().filter(|_| partial),
            matched_tm: result.matched_tm.clone().filter(|_| partial),
            title_suffix: result.title_suffix.clone(),
            is_pdf_result: None,
        }
    }

    /// Shape used by the event stream, which also flags real documents.
    pub fn streamed(result: &SearchResult) -> Self {
        Self {
            is_pdf_result: Some(result.method != SearchMethod::ManualFallback),
            ..Self::from_result(result)
        }
    }
}

/// `400 {"error": message}`.
pub fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_fields_only_for_partial_matches() {
        let exact = SearchResult::new("u", "TM", 95, SearchMethod::DirectPdf, "Site");
        let json = serde_json::to_value(ResultView::from_result(&exact)).unwrap();
        assert!(json.get("partial_match").is_none());
        assert!(json.get("isPdfResult").is_none());
        assert_eq!(json["source"], "Site");
        assert_eq!(json["description"], "Found via Site using direct_pdf method");

        let partial = exact.with_partial_match("9-6115-639-10", "9-6115-639-13");
        let json = serde_json::to_value(ResultView::streamed(&partial)).unwrap();
        assert_eq!(json["partial_match"], true);
        assert_eq!(json["original_query"], "9-6115-639-10");
        assert_eq!(json["matched_tm"], "9-6115-639-13");
        assert_eq!(json["title_suffix"], "Partial match for 9-6115-639-10");
        assert_eq!(json["isPdfResult"], true);
    }

    #[test]
    fn test_request_blank_fields() {
        let request: SearchRequest = serde_json::from_str(r#"{"tm": " ", "model": "M1151"}"#).unwrap();
        let query = request.query();
        assert!(query.tm.is_none());
        assert_eq!(query.model.as_deref(), Some("M1151"));
    }
}

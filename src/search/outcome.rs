//! Per-attempt outcomes consumed by the orchestrator loop.

use super::result::SearchResult;

/// What one site (or one method on a site) produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    Found(Vec<SearchResult>),
    NotFound { reason: String },
}

impl SiteOutcome {
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    /// Wrap a single optional hit.
    pub fn from_option(result: Option<SearchResult>, reason: impl Into<String>) -> Self {
        match result {
            Some(result) => Self::Found(vec![result]),
            None => Self::not_found(reason),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn results(&self) -> &[SearchResult] {
        match self {
            Self::Found(results) => results,
            Self::NotFound { .. } => &[],
        }
    }

    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            Self::Found(results) => results,
            Self::NotFound { .. } => Vec::new(),
        }
    }
}

//! Progress events emitted while a search runs.

use tokio::sync::mpsc;

use super::result::SearchResult;

/// An incremental search update.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Status(String),
    Result(Box<SearchResult>),
}

/// Optional sink for [`SearchEvent`]s.
///
/// The buffered search path uses [`SearchProgress::silent`]; the streaming
/// endpoint passes a channel. A closed receiver is ignored so a client that
/// hangs up does not abort the search.
#[derive(Debug, Clone, Default)]
pub struct SearchProgress {
    tx: Option<mpsc::Sender<SearchEvent>>,
}

impl SearchProgress {
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn channel(tx: mpsc::Sender<SearchEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub async fn status(&self, message: impl Into<String>) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(SearchEvent::Status(message.into())).await;
        }
    }

    pub async fn result(&self, result: &SearchResult) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(SearchEvent::Result(Box::new(result.clone()))).await;
        }
    }
}

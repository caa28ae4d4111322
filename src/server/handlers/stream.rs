//! Live manual search over server-sent events.
//!
//! Wire format, one JSON object per `data:` line:
//!
//! ```text
//! data: {"type":"start","message":"..."}
//! data: {"type":"status","message":"Searching Liberated Manuals..."}
//! data: {"type":"result","index":0,"data":{...}}
//! data: {"type":"complete","message":"...","data":{"total":1,"success":true}}
//! ```

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use super::super::AppState;
use super::helpers::{ResultView, SearchRequest};
use super::search::parse_query;
use crate::search::{ManualSearcher, SearchEvent, SearchMethod, SearchProgress, SearchQuery};

const CHANNEL_CAPACITY: usize = 32;

/// Start a search and stream its progress as it happens.
pub async fn search_stream(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let query = match parse_query(payload) {
        Ok(q) => q,
        Err(response) => return response,
    };
    info!(tm = ?query.tm, model = ?query.model, "Streaming search request");

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(run_search(state.searcher, query, tx));

    Sse::new(ReceiverStream::new(rx))
        .keep_alive(KeepAlive::default())
        .into_response()
}

type EventSender = mpsc::Sender<Result<Event, Infallible>>;

async fn send(tx: &EventSender, payload: Value) {
    // The client may have gone away; the search still runs to completion.
    if tx.send(Ok(Event::default().data(payload.to_string()))).await.is_err() {
        debug!("Stream client disconnected");
    }
}

/// Drive the searcher, translating its events into SSE frames.
async fn run_search(searcher: ManualSearcher, query: SearchQuery, tx: EventSender) {
    send(
        &tx,
        json!({"type": "start", "message": "Search started with partial matching support"}),
    )
    .await;

    let (progress_tx, mut progress_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let search = async move {
        let progress = SearchProgress::channel(progress_tx);
        searcher.search(&query, &progress).await
    };

    let frames = tx.clone();
    let forward = async move {
        let mut index = 0usize;
        let mut found_document = false;

        while let Some(event) = progress_rx.recv().await {
            let payload = match event {
                SearchEvent::Status(message) => json!({"type": "status", "message": message}),
                SearchEvent::Result(result) => {
                    found_document |= result.method != SearchMethod::ManualFallback;
                    let payload = json!({
                        "type": "result",
                        "index": index,
                        "data": ResultView::streamed(&result),
                    });
                    index += 1;
                    payload
                }
            };
            send(&frames, payload).await;
        }
        (index, found_document)
    };

    let (outcome, (total, success)) = tokio::join!(search, forward);

    let payload = match outcome {
        Ok(_) => {
            let message = if success {
                format!("Search completed successfully - found {} manual(s)", total)
            } else {
                "Search completed - no results found".to_string()
            };
            info!("{}", message);
            json!({
                "type": "complete",
                "message": message,
                "data": {"total": total, "success": success},
            })
        }
        Err(e) => {
            warn!("Streaming search failed: {}", e);
            json!({"type": "error", "message": format!("Search error: {}", e)})
        }
    };
    send(&tx, payload).await;
}

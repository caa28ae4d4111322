//! HTTP request handlers for the web server.

mod api;
mod extract;
mod helpers;
mod search;
mod stream;

// Re-export handlers for use by the router
pub use api::{health, list_mappings, test_tm};
pub use extract::extract;
pub use search::search;
pub use stream::search_stream;

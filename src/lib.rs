//! tmscout - military equipment nameplate OCR and technical manual search.
//!
//! Reads model and TM numbers off nameplate photos and locates the matching
//! technical manual PDFs across a fixed set of public archives.

pub mod cli;
pub mod config;
pub mod extract;
pub mod http_client;
pub mod identifiers;
pub mod mapping;
pub mod ocr;
pub mod search;
pub mod server;

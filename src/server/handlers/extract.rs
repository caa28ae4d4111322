//! Nameplate photo upload and OCR.

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use super::super::AppState;
use super::helpers::bad_request;
use crate::extract::extract_fields;

/// OCR an uploaded image (multipart field `file`) and pull out model and TM.
pub async fn extract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let started = Instant::now();

    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => return bad_request(e.body_text()),
    };

    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((filename, bytes)),
                    Err(e) => return bad_request(e.body_text()),
                }
                break;
            }
            Ok(None) => break,
            Err(e) => return bad_request(e.body_text()),
        }
    }

    let Some((filename, bytes)) = upload else {
        return bad_request("No image file uploaded");
    };
    if filename.is_empty() || bytes.is_empty() {
        return bad_request("No image file selected");
    }
    info!("Processing upload {} ({} bytes)", filename, bytes.len());

    match state.ocr.recognize(bytes.to_vec()).await {
        Ok(ocr) => {
            let fields = extract_fields(&ocr.text);
            let elapsed = started.elapsed().as_secs_f64();
            info!(
                model = ?fields.model,
                tm = ?fields.tm,
                "Extraction finished in {:.2}s",
                elapsed
            );

            Json(json!({
                "found": fields.found(),
                "model": fields.model,
                "tm": fields.tm,
                "ocr_text": ocr.text,
                "engine": ocr.engine,
                "processing_time": (elapsed * 100.0).round() / 100.0,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("OCR failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.to_string(),
                    "model": null,
                    "tm": null,
                    "found": false,
                })),
            )
                .into_response()
        }
    }
}

use axum::extract::{Multipart, State};
use axum::http::StatusCode;

use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::ingest::ScanOutcome;

const NO_IMAGE: &str = "No image provided";

/// `POST /api/scan`
///
/// Multipart form with the full frame in `image` and the serial crop in
/// `ocrImage`. Only the crop is read; the frame is stored as `<serial>.png`.
pub async fn scan(State(state): State<AppState>, mut multipart: Multipart) -> ApiResponse<ScanOutcome> {
    let mut full_frame: Option<Vec<u8>> = None;
    let mut crop: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let slot = match name.as_str() {
            "image" => &mut full_frame,
            "ocrImage" => &mut crop,
            _ => continue,
        };

        match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => *slot = Some(bytes.to_vec()),
            Ok(_) => {}
            Err(e) => {
                return ApiResponse::error(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read {name}: {e}"),
                );
            }
        }
    }

    let (Some(full_frame), Some(crop)) = (full_frame, crop) else {
        return ApiResponse::error(StatusCode::BAD_REQUEST, NO_IMAGE);
    };

    match state.scans.scan(&full_frame, &crop).await {
        Ok(outcome) => ApiResponse::success(outcome),
        Err(e) => e.into(),
    }
}

use axum::extract::{Path, State};

use crate::api::dto::{CapturedImagesResponse, RenameRequest};
use crate::api::extractors::AppJson;
use crate::api::response::{ApiResponse, Empty};
use crate::api::AppState;

/// `GET /api/captured-images`
pub async fn list_captured_images(State(state): State<AppState>) -> ApiResponse<CapturedImagesResponse> {
    match state.captures.list().await {
        Ok(images) => {
            let images: Vec<String> = images.into_iter().map(|image| image.file_name).collect();
            ApiResponse::success(CapturedImagesResponse {
                count: images.len(),
                images,
            })
        }
        Err(e) => e.into(),
    }
}

/// `DELETE /api/captured-images/{filename}`
pub async fn delete_captured_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResponse<Empty> {
    match state.captures.delete(&filename).await {
        Ok(()) => ApiResponse::success(Empty {}),
        Err(e) => e.into(),
    }
}

/// `POST /api/captured-images/{filename}/rename`
pub async fn rename_captured_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    AppJson(req): AppJson<RenameRequest>,
) -> ApiResponse<Empty> {
    match state.captures.rename(&filename, &req.new_name).await {
        Ok(()) => ApiResponse::success(Empty {}),
        Err(e) => e.into(),
    }
}

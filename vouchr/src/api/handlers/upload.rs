use axum::extract::State;
use tracing::warn;

use crate::api::dto::{UploadRequestDto, UploadResponse};
use crate::api::extractors::AppJson;
use crate::api::response::ApiResponse;
use crate::api::AppState;

/// `POST /api/upload`
pub async fn upload(
    State(state): State<AppState>,
    AppJson(req): AppJson<UploadRequestDto>,
) -> ApiResponse<UploadResponse> {
    let request = match req.into_upload_request() {
        Ok(request) => request,
        Err(e) => return e.into(),
    };

    match state.uploads.upload(&request).await {
        Ok(result) => ApiResponse::success(UploadResponse { result }),
        Err(e) => {
            warn!(file = %request.file_name, error = %e, "Upload rejected");
            e.into()
        }
    }
}

//! Response envelope shared by every `/api` endpoint.
//!
//! ```json
//! { "success": true, "serialNumber": "123", "savedAs": "123.png" }
//! { "success": false, "error": "Invalid filename" }
//! ```
//!
//! Payload fields are flattened next to `success`; the error message is the
//! display form of the [`VouchrError`] that ended the request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::VouchrError;

/// Payload for endpoints that only report success.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                let body = serde_json::json!({
                    "success": false,
                    "error": "An internal error occurred"
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<VouchrError> for ApiResponse<T> {
    fn from(err: VouchrError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        }
        ApiResponse::error(status, err.to_string())
    }
}

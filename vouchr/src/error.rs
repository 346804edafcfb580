use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VouchrError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Extraction(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    #[error("Drive error: {0}")]
    Drive(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl VouchrError {
    /// Whether repeating the failed operation could succeed.
    ///
    /// Duplicates, bad input, missing files and missing credentials never
    /// change between attempts, so the retry loop stops on them immediately.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            VouchrError::Duplicate(_)
                | VouchrError::Validation(_)
                | VouchrError::NotFound(_)
                | VouchrError::Unauthenticated(_)
                | VouchrError::Extraction(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            VouchrError::Validation(_) | VouchrError::Json(_) => StatusCode::BAD_REQUEST,
            VouchrError::NotFound(_) => StatusCode::NOT_FOUND,
            VouchrError::Duplicate(_) => StatusCode::CONFLICT,
            VouchrError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            VouchrError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            VouchrError::Http(_) | VouchrError::Drive(_) => StatusCode::BAD_GATEWAY,
            VouchrError::Database(_)
            | VouchrError::Extraction(_)
            | VouchrError::Ocr(_)
            | VouchrError::Processing(_)
            | VouchrError::Io(_)
            | VouchrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for VouchrError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, VouchrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_is_terminal() {
        assert!(!VouchrError::Duplicate("Duplicate voucher found: 1.png".into()).is_retryable());
        assert!(!VouchrError::Validation("bad".into()).is_retryable());
        assert!(!VouchrError::Unauthenticated("no tokens".into()).is_retryable());
    }

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(VouchrError::Drive("503".into()).is_retryable());
        assert!(VouchrError::Internal("lock".into()).is_retryable());
        assert!(VouchrError::Io(std::io::Error::other("blip")).is_retryable());
    }

    #[test]
    fn duplicate_message_is_verbatim() {
        let err = VouchrError::Duplicate("Duplicate voucher found: 42.png".into());
        assert_eq!(err.to_string(), "Duplicate voucher found: 42.png");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn into_response_uses_failure_envelope() {
        let response = VouchrError::Validation("Invalid filename".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid filename");
    }
}

pub mod auth;
pub mod captures;
pub mod scan;
pub mod upload;

use axum::Json;

use super::dto::HealthResponse;

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

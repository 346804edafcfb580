use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Replaces axum's 2 MB extractor default for every route.
    let body_limit = state.config.server.body_limit_mb * 1024 * 1024;

    let api = Router::new()
        .route("/scan", post(handlers::scan::scan))
        .route(
            "/captured-images",
            get(handlers::captures::list_captured_images),
        )
        .route(
            "/captured-images/{filename}",
            delete(handlers::captures::delete_captured_image),
        )
        .route(
            "/captured-images/{filename}/rename",
            post(handlers::captures::rename_captured_image),
        )
        .route("/upload", post(handlers::upload::upload));

    let auth = Router::new()
        .route("/google", get(handlers::auth::google_login))
        .route("/google/callback", get(handlers::auth::google_callback))
        .route("/status", get(handlers::auth::auth_status));

    Router::new()
        .nest("/api", api)
        .nest("/auth", auth)
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

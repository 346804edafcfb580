use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info};

use crate::api::dto::AuthStatusResponse;
use crate::api::AppState;
use crate::error::VouchrError;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// `GET /auth/google`
pub async fn google_login(State(state): State<AppState>) -> Response {
    match state.auth.oauth().authorize_url() {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let outcome = match (params.code, params.error) {
        (Some(code), _) => state.auth.complete_login(&code).await,
        (None, Some(reason)) => Err(VouchrError::Unauthenticated(format!(
            "Consent denied: {reason}"
        ))),
        (None, None) => Err(VouchrError::Validation(
            "Callback is missing the authorization code".to_string(),
        )),
    };

    match outcome {
        Ok(()) => {
            info!("Google account linked");
            Redirect::to("/?auth=success")
        }
        Err(e) => {
            error!(error = %e, "Google sign-in failed");
            Redirect::to("/?auth=error")
        }
    }
}

/// `GET /auth/status`
pub async fn auth_status(State(state): State<AppState>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: state.auth.is_authenticated().await,
    })
}

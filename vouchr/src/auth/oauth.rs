use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::GoogleConfig;
use crate::error::{Result, VouchrError};

use super::store::OAuthTokens;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Google OAuth 2.0 web-server flow.
#[derive(Clone, Debug)]
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl TokenResponse {
    fn into_tokens(self, previous_refresh: Option<String>) -> OAuthTokens {
        let now_ms = Utc::now().timestamp_millis();
        OAuthTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            scope: self.scope,
            token_type: self.token_type,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
        }
    }
}

impl GoogleOAuth {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| VouchrError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        })
    }

    /// Consent page URL. Offline access with a forced consent prompt so
    /// Google always hands back a refresh token.
    pub fn authorize_url(&self) -> Result<Url> {
        let scope = SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|e| VouchrError::Internal(format!("Invalid GOOGLE_AUTH_URL: {e}")))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", &self.redirect_uri),
            ])
            .await?;
        Ok(response.into_tokens(None))
    }

    pub async fn refresh(&self, tokens: &OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            VouchrError::Unauthenticated(
                "Access token expired and no refresh token is stored".to_string(),
            )
        })?;

        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .await?;

        tracing::info!("Google access token refreshed");
        Ok(response.into_tokens(tokens.refresh_token.clone()))
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self.client.post(&self.token_url).form(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 400/401 from the token endpoint mean the grant itself is dead.
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    VouchrError::Unauthenticated(format!("Token request rejected: {body}"))
                }
                _ => VouchrError::Drive(format!("Token request failed: {status} - {body}")),
            });
        }

        response
            .json()
            .await
            .map_err(|e| VouchrError::Drive(format!("Failed to parse token response: {e}")))
    }
}

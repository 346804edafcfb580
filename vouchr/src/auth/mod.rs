//! Google account linkage: the consent flow and the persisted credentials
//! that every Drive upload runs under.

mod oauth;
mod store;

use std::sync::Arc;

use chrono::Utc;

use crate::error::{Result, VouchrError};

pub use oauth::{GoogleOAuth, SCOPES};
pub use store::{FileTokenStore, MemoryTokenStore, OAuthTokens, TokenStore};

/// Hands out a usable access token, refreshing and persisting it when the
/// stored one has expired.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn TokenStore>,
    oauth: GoogleOAuth,
}

impl Authenticator {
    pub fn new(store: Arc<dyn TokenStore>, oauth: GoogleOAuth) -> Self {
        Self { store, oauth }
    }

    pub fn oauth(&self) -> &GoogleOAuth {
        &self.oauth
    }

    pub async fn is_authenticated(&self) -> bool {
        self.store.exists().await
    }

    /// Finishes the consent redirect: trade the code for tokens and keep them.
    pub async fn complete_login(&self, code: &str) -> Result<()> {
        let tokens = self.oauth.exchange_code(code).await?;
        self.store.save(&tokens).await
    }

    pub async fn access_token(&self) -> Result<String> {
        let tokens = self.store.load().await?.ok_or_else(|| {
            VouchrError::Unauthenticated(
                "No Google credentials stored. Sign in via /auth/google".to_string(),
            )
        })?;

        if !tokens.is_expired(Utc::now()) {
            return Ok(tokens.access_token);
        }

        let refreshed = self.oauth.refresh(&tokens).await?;
        self.store.save(&refreshed).await?;
        Ok(refreshed.access_token)
    }
}

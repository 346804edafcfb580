use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, VouchrError};

/// Refresh this long before the recorded expiry.
const EXPIRY_SKEW_MS: i64 = 60_000;

/// Google OAuth credential set, stored in the same JSON shape as the
/// googleapis client writes (`expiry_date` in epoch milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

impl OAuthTokens {
    /// Tokens without a recorded expiry are assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date
            .is_some_and(|expiry| expiry - EXPIRY_SKEW_MS <= now.timestamp_millis())
    }
}

/// Where OAuth credentials live between requests.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<OAuthTokens>>;

    async fn save(&self, tokens: &OAuthTokens) -> Result<()>;

    async fn exists(&self) -> bool {
        matches!(self.load().await, Ok(Some(_)))
    }
}

/// Single JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<OAuthTokens>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                tracing::error!(path = %self.path.display(), error = %e, "Token file is corrupt");
                VouchrError::Unauthenticated(
                    "Stored Google credentials are unreadable. Sign in again via /auth/google"
                        .to_string(),
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, tokens: &OAuthTokens) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(tokens)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::info!(path = %self.path.display(), "OAuth tokens saved");
        Ok(())
    }
}

/// Process-local store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<OAuthTokens>>,
}

impl MemoryTokenStore {
    pub fn new(tokens: Option<OAuthTokens>) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<OAuthTokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn save(&self, tokens: &OAuthTokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tokens(expiry_date: Option<i64>) -> OAuthTokens {
        OAuthTokens {
            access_token: "ya29.token".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            scope: Some("https://www.googleapis.com/auth/drive".to_string()),
            token_type: Some("Bearer".to_string()),
            expiry_date,
        }
    }

    #[test]
    fn test_expiry_with_skew() {
        let now = Utc::now();
        assert!(!tokens(None).is_expired(now));
        assert!(!tokens(Some((now + Duration::minutes(10)).timestamp_millis())).is_expired(now));
        assert!(tokens(Some((now + Duration::seconds(30)).timestamp_millis())).is_expired(now));
        assert!(tokens(Some((now - Duration::hours(1)).timestamp_millis())).is_expired(now));
    }

    #[test]
    fn test_reads_googleapis_token_file() {
        let raw = r#"{
            "access_token": "ya29.a0Af",
            "refresh_token": "1//0g",
            "scope": "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/userinfo.email",
            "token_type": "Bearer",
            "id_token": "eyJhbGciOi",
            "expiry_date": 1718000000000
        }"#;
        let parsed: OAuthTokens = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.access_token, "ya29.a0Af");
        assert_eq!(parsed.expiry_date, Some(1_718_000_000_000));
    }

    #[tokio::test]
    async fn test_file_store_missing_then_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("tokens.json"));

        assert!(store.load().await.unwrap().is_none());
        assert!(!store.exists().await);

        let saved = tokens(Some(1));
        store.save(&saved).await.unwrap();
        assert!(store.exists().await);
        assert_eq!(store.load().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = FileTokenStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, VouchrError::Unauthenticated(_)));
        assert!(!err.is_retryable());
        assert!(!store.exists().await);

        store.save(&tokens(None)).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::default();
        assert!(!store.exists().await);
        store.save(&tokens(None)).await.unwrap();
        assert!(store.exists().await);
    }
}

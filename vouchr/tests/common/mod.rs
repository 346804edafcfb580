// Common test utilities for integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use image::{ImageFormat, RgbImage};

use vouchr::api::{create_router, AppState};
use vouchr::auth::{Authenticator, GoogleOAuth, MemoryTokenStore, OAuthTokens, TokenStore};
use vouchr::config::Config;
use vouchr::db::{Database, LibSqlBackend, VoucherStore};
use vouchr::drive::{CloudStore, UploadedFile};
use vouchr::error::{Result, VouchrError};
use vouchr::ocr::{OcrRace, TextRecognizer};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Recognizer with a canned answer after a fixed delay.
pub struct StubRecognizer {
    pub name: &'static str,
    pub delay: Duration,
    pub outcome: std::result::Result<&'static str, &'static str>,
}

impl StubRecognizer {
    pub fn answers(name: &'static str, text: &'static str, delay_ms: u64) -> Arc<dyn TextRecognizer> {
        Arc::new(Self {
            name,
            delay: Duration::from_millis(delay_ms),
            outcome: Ok(text),
        })
    }

    pub fn fails(name: &'static str, message: &'static str) -> Arc<dyn TextRecognizer> {
        Arc::new(Self {
            name,
            delay: Duration::ZERO,
            outcome: Err(message),
        })
    }
}

#[async_trait]
impl TextRecognizer for StubRecognizer {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn recognize(&self, _image_bytes: &[u8]) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        self.outcome
            .map(str::to_string)
            .map_err(|e| VouchrError::Ocr(e.to_string()))
    }
}

/// In-memory Drive that counts what reaches it.
#[derive(Default)]
pub struct FakeCloud {
    pub folder_calls: AtomicUsize,
    pub uploads: AtomicUsize,
}

impl FakeCloud {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn folder_count(&self) -> usize {
        self.folder_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudStore for FakeCloud {
    async fn ensure_folder(&self, _access_token: &str, _name: &str) -> Result<String> {
        self.folder_calls.fetch_add(1, Ordering::SeqCst);
        Ok("folder-1".to_string())
    }

    async fn upload_file(
        &self,
        _access_token: &str,
        _folder_id: &str,
        _file_name: &str,
        _bytes: Vec<u8>,
        _mime_type: &str,
    ) -> Result<UploadedFile> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(UploadedFile {
            id: format!("file-{n}"),
            web_view_link: Some(format!(
                "https://drive.google.com/file/d/file-{n}/view?usp=drivesdk"
            )),
        })
    }

    async fn make_public(&self, _access_token: &str, _file_id: &str) -> Result<()> {
        Ok(())
    }
}

pub fn signed_in_tokens() -> OAuthTokens {
    OAuthTokens {
        access_token: "ya29.integration".to_string(),
        refresh_token: Some("1//integration".to_string()),
        scope: None,
        token_type: Some("Bearer".to_string()),
        expiry_date: None,
    }
}

/// Config pointing every path into `dir` with near-zero retry delays.
pub fn test_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.storage.captured_dir = dir.path().join("captured");
    config.storage.tokens_path = dir.path().join("tokens.json");
    config.database.url = format!("file:{}", dir.path().join("vouchr.db").display());
    config.database.local_path = None;
    config.database.auth_token = None;
    config.upload.retry_delay_ms = 1;
    config.upload.upload_retry_delay_ms = 1;
    config.google.folder_name = "hanzlenord".to_string();
    config
}

pub async fn open_store(config: &Config) -> Arc<LibSqlBackend> {
    Arc::new(LibSqlBackend::new(
        Database::new(&config.database).await.unwrap(),
    ))
}

pub struct TestApp {
    pub router: Router,
    pub dir: tempfile::TempDir,
    pub captured_dir: PathBuf,
    pub store: Arc<LibSqlBackend>,
    pub cloud: Arc<FakeCloud>,
}

pub async fn test_app(
    recognizers: Vec<Arc<dyn TextRecognizer>>,
    tokens: Option<OAuthTokens>,
) -> TestApp {
    init_test_logger();

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let captured_dir = config.storage.captured_dir.clone();
    tokio::fs::create_dir_all(&captured_dir).await.unwrap();

    let store = open_store(&config).await;
    let cloud = Arc::new(FakeCloud::default());
    let token_store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new(tokens));
    let auth = Authenticator::new(token_store, GoogleOAuth::new(&config.google).unwrap());
    let ocr = OcrRace::new(recognizers, Duration::from_millis(200));

    let state = AppState::new(
        config,
        ocr,
        store.clone() as Arc<dyn VoucherStore>,
        cloud.clone() as Arc<dyn CloudStore>,
        auth,
    );

    TestApp {
        router: create_router(state),
        dir,
        captured_dir,
        store,
        cloud,
    }
}

/// A small PNG with some texture so JPEG sizes vary with quality.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// `multipart/form-data` body; each part is `(field, file name, bytes)`.
pub fn multipart_body(boundary: &str, parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, file_name, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

// Re-export commonly used crates for convenience
pub use tempfile;
pub use wiremock;

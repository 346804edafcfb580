use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated list, dropping blank entries.
fn parse_env_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub google: GoogleConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Flat directory holding captured frames named `<serial>.png`.
    pub captured_dir: PathBuf,
    pub tokens_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// OCR.space API keys, tried in order.
    pub api_keys: Vec<String>,
    pub base_url: String,
    pub languages: String,
    pub timeout_secs: u64,
    pub local_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub drive_api_url: String,
    pub drive_upload_url: String,
    pub folder_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_height: u32,
    pub target_kb: usize,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub upload_retry_delay_ms: u64,
}

impl UploadConfig {
    pub fn target_bytes(&self) -> usize {
        self.target_kb * 1024
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn upload_retry_delay(&self) -> Duration {
        Duration::from_millis(self.upload_retry_delay_ms)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: "https://api.ocr.space".to_string(),
            languages: "eng".to_string(),
            timeout_secs: 30,
            local_enabled: true,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:3000/auth/google/callback".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            drive_api_url: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            folder_name: "hanzlenord".to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_height: 720,
            target_kb: 100,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            upload_retry_delay_ms: 2000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr_defaults = OcrConfig::default();
        let google_defaults = GoogleConfig::default();
        let upload_defaults = UploadConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("VOUCHR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("VOUCHR_PORT", 3000),
                body_limit_mb: parse_env_or("VOUCHR_BODY_LIMIT_MB", 50),
            },
            storage: StorageConfig {
                captured_dir: env::var("CAPTURED_DIR")
                    .unwrap_or_else(|_| "captured".to_string())
                    .into(),
                tokens_path: env::var("TOKENS_PATH")
                    .unwrap_or_else(|_| "tokens.json".to_string())
                    .into(),
            },
            ocr: OcrConfig {
                api_keys: parse_env_list("OCR_API_KEYS"),
                base_url: env::var("OCR_BASE_URL").unwrap_or(ocr_defaults.base_url),
                languages: env::var("OCR_LANGUAGES").unwrap_or(ocr_defaults.languages),
                timeout_secs: parse_env_or("OCR_TIMEOUT", ocr_defaults.timeout_secs),
                local_enabled: parse_env_or("OCR_LOCAL_ENABLED", ocr_defaults.local_enabled),
            },
            google: GoogleConfig {
                client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                    .unwrap_or(google_defaults.redirect_uri),
                auth_url: env::var("GOOGLE_AUTH_URL").unwrap_or(google_defaults.auth_url),
                token_url: env::var("GOOGLE_TOKEN_URL").unwrap_or(google_defaults.token_url),
                drive_api_url: env::var("DRIVE_API_URL")
                    .unwrap_or(google_defaults.drive_api_url),
                drive_upload_url: env::var("DRIVE_UPLOAD_URL")
                    .unwrap_or(google_defaults.drive_upload_url),
                folder_name: env::var("DRIVE_FOLDER").unwrap_or(google_defaults.folder_name),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:vouchr.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
            },
            upload: UploadConfig {
                max_height: parse_env_or("UPLOAD_MAX_HEIGHT", upload_defaults.max_height),
                target_kb: parse_env_or("UPLOAD_TARGET_KB", upload_defaults.target_kb),
                retry_attempts: parse_env_or("RETRY_ATTEMPTS", upload_defaults.retry_attempts),
                retry_delay_ms: parse_env_or("RETRY_DELAY_MS", upload_defaults.retry_delay_ms),
                upload_retry_delay_ms: parse_env_or(
                    "UPLOAD_RETRY_DELAY_MS",
                    upload_defaults.upload_retry_delay_ms,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vouchr::api::{create_router, AppState};
use vouchr::auth::{Authenticator, FileTokenStore, GoogleOAuth, TokenStore};
use vouchr::config::Config;
use vouchr::db::{Database, LibSqlBackend, VoucherStore};
use vouchr::drive::{CloudStore, DriveClient};
use vouchr::ocr::OcrRace;
use vouchr::storage::CaptureStore;

#[derive(Parser)]
#[command(name = "vouchr")]
#[command(about = "Scan voucher serials and archive the vouchers to Google Drive")]
struct Args {
    /// Port to listen on (overrides VOUCHR_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for captured frames (overrides CAPTURED_DIR)
    #[arg(long)]
    captured_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let (plain, json) = if args.json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vouchr=info,tower_http=debug".into()),
        )
        .with(plain)
        .with(json)
        .init();

    let mut config = Config::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.captured_dir {
        config.storage.captured_dir = dir;
    }

    if config.google.client_id.is_empty() || config.google.client_secret.is_empty() {
        tracing::warn!("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set - Drive uploads will fail");
    }

    CaptureStore::new(&config.storage.captured_dir)
        .ensure_dir()
        .await?;

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;
    let store: Arc<dyn VoucherStore> = Arc::new(LibSqlBackend::new(db));

    let ocr = OcrRace::from_config(&config.ocr)?;
    tracing::info!(strategies = ?ocr.strategies(), "OCR race ready");

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.storage.tokens_path));
    let auth = Authenticator::new(tokens, GoogleOAuth::new(&config.google)?);
    if !auth.is_authenticated().await {
        tracing::warn!("No Google credentials yet - sign in via /auth/google");
    }
    let cloud: Arc<dyn CloudStore> = Arc::new(DriveClient::new(&config.google)?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, ocr, store, cloud, auth);
    let app = create_router(state);

    tracing::info!("Vouchr starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  Google sign-in: http://{}/auth/google", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

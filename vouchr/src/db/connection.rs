use std::sync::Arc;

use libsql::{Builder, Connection};

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Where the voucher table lives, as read from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Remote { url: String, token: String },
    Replica { path: String, url: String, token: String },
    Memory,
    File(String),
}

impl Target {
    fn from_config(config: &DatabaseConfig) -> Self {
        let url = config.url.trim();
        let token = config.auth_token.clone().unwrap_or_default();

        if url.starts_with("libsql://") || url.starts_with("https://") {
            return match &config.local_path {
                Some(path) => Target::Replica {
                    path: path.clone(),
                    url: url.to_string(),
                    token,
                },
                None => Target::Remote {
                    url: url.to_string(),
                    token,
                },
            };
        }

        match url {
            ":memory:" => Target::Memory,
            other => Target::File(other.strip_prefix("file:").unwrap_or(other).to_string()),
        }
    }

    fn describe(&self) -> &str {
        match self {
            Target::Remote { url, .. } => url,
            Target::Replica { path, .. } => path,
            Target::Memory => ":memory:",
            Target::File(path) => path,
        }
    }
}

/// Shared libSQL handle. Callers open a fresh [`Connection`] per operation.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
}

impl Database {
    /// Opens the database, applies connection pragmas and creates the schema.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let target = Target::from_config(config);

        let db = match &target {
            Target::Remote { url, token } => {
                Builder::new_remote(url.clone(), token.clone()).build().await?
            }
            Target::Replica { path, url, token } => {
                Builder::new_remote_replica(path, url.clone(), token.clone())
                    .build()
                    .await?
            }
            Target::Memory => Builder::new_local(":memory:").build().await?,
            Target::File(path) => Builder::new_local(path).build().await?,
        };

        let database = Self { db: Arc::new(db) };
        let conn = database.connect()?;
        apply_pragmas(&conn, config.busy_timeout_ms).await;
        schema::init_schema(&conn).await?;

        tracing::info!(location = target.describe(), "Voucher database ready");
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }
}

/// Best effort: remote targets reject some pragmas, which is not fatal.
async fn apply_pragmas(conn: &Connection, busy_timeout_ms: u64) {
    let statements = [
        format!("PRAGMA busy_timeout = {busy_timeout_ms}"),
        "PRAGMA journal_mode = WAL".to_string(),
    ];

    for sql in &statements {
        if let Err(error) = conn.execute_batch(sql).await {
            tracing::warn!(pragma = %sql, error = %error, "Failed to apply SQLite pragma");
        }
    }
}

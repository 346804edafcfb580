//! Full-frame captures kept on local disk until they are uploaded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{Result, VouchrError};
use crate::models::CapturedImage;

const CAPTURE_EXTENSION: &str = "png";

/// Flat directory of `<serial>.png` files.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes the frame as `<serial>.png`, replacing an earlier capture of
    /// the same serial. Returns the file name.
    pub async fn save(&self, serial: &str, bytes: &[u8]) -> Result<String> {
        let file_name = format!("{serial}.{CAPTURE_EXTENSION}");
        let path = self.path_for(&file_name)?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(file = %file_name, "Overwriting existing capture");
        }
        tokio::fs::write(&path, bytes).await?;

        info!(file = %file_name, bytes = bytes.len(), "Capture saved");
        Ok(file_name)
    }

    /// `.png` captures, newest first.
    pub async fn list(&self) -> Result<Vec<CapturedImage>> {
        let mut images = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(images),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_capture(&file_name) {
                continue;
            }

            let modified_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| DateTime::<Utc>::from(std::time::UNIX_EPOCH));

            images.push(CapturedImage {
                file_name,
                modified_at,
                size_bytes: metadata.len(),
            });
        }

        images.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        Ok(images)
    }

    pub async fn delete(&self, file_name: &str) -> Result<()> {
        let path = self.existing_path(file_name).await?;
        tokio::fs::remove_file(&path).await?;
        info!(file = %file_name, "Capture deleted");
        Ok(())
    }

    pub async fn rename(&self, file_name: &str, new_name: &str) -> Result<()> {
        let target = self.path_for(new_name)?;
        let source = self.existing_path(file_name).await?;

        if file_name != new_name && tokio::fs::try_exists(&target).await? {
            return Err(VouchrError::Validation(format!(
                "A file named {new_name} already exists"
            )));
        }

        tokio::fs::rename(&source, &target).await?;
        info!(from = %file_name, to = %new_name, "Capture renamed");
        Ok(())
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.dir.join(file_name))
    }

    async fn existing_path(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.path_for(file_name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Err(VouchrError::NotFound(format!("File {file_name}")));
        }
        Ok(path)
    }
}

/// A bare file name: non-empty, no separators, not a dot entry.
pub fn validate_file_name(name: &str) -> Result<&str> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\', '\0'])
        || name == "."
        || name == "..";

    if invalid {
        return Err(VouchrError::Validation("Invalid filename".to_string()));
    }
    Ok(name)
}

fn is_capture(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CAPTURE_EXTENSION))
}

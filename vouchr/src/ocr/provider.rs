use std::sync::Arc;

use async_trait::async_trait;
use leptess::LepTess;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::OcrConfig;
use crate::error::{Result, VouchrError};

use super::TextRecognizer;

type Engine = Arc<Mutex<LepTess>>;

/// Embedded Tesseract engine. When Tesseract or its language data is missing
/// every call fails with [`VouchrError::OcrUnavailable`] and the remote
/// strategy is left to win the race.
pub struct TesseractRecognizer {
    engine: std::result::Result<Engine, String>,
}

impl TesseractRecognizer {
    pub fn new(config: &OcrConfig) -> Self {
        let engine = if config.local_enabled {
            load_engine(&config.languages)
        } else {
            Err("local OCR disabled by OCR_LOCAL_ENABLED".to_string())
        };

        if let Err(reason) = &engine {
            tracing::warn!(reason = %reason, "Local OCR strategy unavailable");
        }
        Self { engine }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_ok()
    }
}

fn load_engine(languages: &str) -> std::result::Result<Engine, String> {
    let tess = LepTess::new(None, languages)
        .map_err(|e| format!("Tesseract not available for '{languages}': {e}"))?;
    tracing::info!(languages, "Local OCR strategy ready");
    Ok(Arc::new(Mutex::new(tess)))
}

/// Fails fast while a scan abandoned by the race timeout still owns the engine.
fn claim<T>(engine: &Arc<Mutex<T>>) -> Result<OwnedMutexGuard<T>> {
    Arc::clone(engine).try_lock_owned().map_err(|_| {
        VouchrError::OcrUnavailable("local OCR engine is busy with an earlier scan".to_string())
    })
}

fn read_page(mut tess: OwnedMutexGuard<LepTess>, image: &[u8]) -> Result<String> {
    tess.set_image_from_mem(image)
        .map_err(|e| VouchrError::Ocr(format!("Tesseract rejected the crop: {e}")))?;
    let text = tess
        .get_utf8_text()
        .map_err(|e| VouchrError::Ocr(format!("Tesseract produced no text: {e}")))?;
    Ok(text.trim().to_string())
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let tess = match &self.engine {
            Ok(engine) => claim(engine)?,
            Err(reason) => return Err(VouchrError::OcrUnavailable(reason.clone())),
        };
        let image = image_bytes.to_vec();

        tokio::task::spawn_blocking(move || read_page(tess, &image))
            .await
            .map_err(|e| VouchrError::Ocr(format!("Local OCR worker stopped: {e}")))?
    }
}

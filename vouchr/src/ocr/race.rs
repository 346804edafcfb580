use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use crate::config::OcrConfig;
use crate::error::{Result, VouchrError};

use super::{normalize_digits, OcrSpaceClient, TesseractRecognizer, TextRecognizer};

/// Resolve to the first candidate that succeeds.
///
/// Candidates are polled concurrently. Once one yields `Ok`, the rest are
/// dropped, which cancels them at their next await point. If every candidate
/// fails, all errors are returned in completion order.
pub async fn first_success<I, Fut, T, E>(candidates: I) -> std::result::Result<T, Vec<E>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut pending: FuturesUnordered<Fut> = candidates.into_iter().collect();
    let mut errors = Vec::with_capacity(pending.len());

    while let Some(outcome) = pending.next().await {
        match outcome {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }

    Err(errors)
}

/// Races every configured recognizer over the same crop and keeps the first
/// usable answer.
#[derive(Clone)]
pub struct OcrRace {
    recognizers: Vec<Arc<dyn TextRecognizer>>,
    timeout: Duration,
}

impl OcrRace {
    pub fn new(recognizers: Vec<Arc<dyn TextRecognizer>>, timeout: Duration) -> Self {
        Self {
            recognizers,
            timeout,
        }
    }

    /// OCR.space first, embedded Tesseract second.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let remote = OcrSpaceClient::new(config)?;
        if remote.key_count() == 0 {
            tracing::warn!("OCR_API_KEYS is empty - remote OCR will always fail");
        }
        let local = TesseractRecognizer::new(config);

        Ok(Self::new(
            vec![Arc::new(remote), Arc::new(local)],
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn strategies(&self) -> Vec<&'static str> {
        self.recognizers.iter().map(|r| r.name()).collect()
    }

    /// Extract the voucher serial from `image_bytes`.
    ///
    /// Each recognizer's text is normalized to digits before it competes. A
    /// winner with no digits is still a failure; the race is not re-run.
    pub async fn read_serial(&self, image_bytes: &[u8]) -> Result<String> {
        if self.recognizers.is_empty() {
            return Err(VouchrError::Extraction(
                "No OCR strategy configured".to_string(),
            ));
        }

        let timeout = self.timeout;
        let attempts = self.recognizers.iter().map(|recognizer| async move {
            let name = recognizer.name();
            let started = Instant::now();
            match tokio::time::timeout(timeout, recognizer.recognize(image_bytes)).await {
                Ok(Ok(text)) => {
                    let digits = normalize_digits(&text);
                    debug!(
                        strategy = name,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        raw = %text,
                        digits = %digits,
                        "OCR strategy finished"
                    );
                    Ok((name, digits))
                }
                Ok(Err(e)) => Err(format!("{name}: {e}")),
                Err(_) => Err(format!("{name}: timed out after {}ms", timeout.as_millis())),
            }
        });

        match first_success(attempts).await {
            Ok((winner, digits)) => {
                if digits.is_empty() {
                    return Err(VouchrError::Extraction(format!(
                        "No numeric data found in the image ({winner})"
                    )));
                }
                info!(strategy = winner, serial = %digits, "OCR race won");
                Ok(digits)
            }
            Err(errors) => Err(VouchrError::Extraction(format!(
                "All OCR strategies failed: {}",
                errors.join("; ")
            ))),
        }
    }
}

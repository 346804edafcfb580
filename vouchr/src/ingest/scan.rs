use serde::Serialize;
use tracing::warn;

use crate::error::{Result, VouchrError};
use crate::ocr::OcrRace;
use crate::storage::CaptureStore;

pub const EXTRACTION_FAILED: &str = "Failed to extract numeric data from the image";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub serial_number: String,
    pub saved_as: String,
}

/// Reads the serial off the crop, then files the full frame under it.
#[derive(Clone)]
pub struct ScanService {
    ocr: OcrRace,
    captures: CaptureStore,
}

impl ScanService {
    pub fn new(ocr: OcrRace, captures: CaptureStore) -> Self {
        Self { ocr, captures }
    }

    pub async fn scan(&self, full_frame: &[u8], crop: &[u8]) -> Result<ScanOutcome> {
        let serial_number = self.ocr.read_serial(crop).await.map_err(|e| {
            warn!(error = %e, "Serial extraction failed");
            VouchrError::Extraction(EXTRACTION_FAILED.to_string())
        })?;

        let saved_as = self.captures.save(&serial_number, full_frame).await?;

        Ok(ScanOutcome {
            serial_number,
            saved_as,
        })
    }
}

//! Serial-number OCR.
//!
//! Two recognizers compete on every scan:
//! - `OcrSpaceClient` posts the crop to OCR.space, rotating through the
//!   configured API keys until one returns text
//! - `TesseractRecognizer` runs an embedded Tesseract (via leptess)
//!
//! [`OcrRace`] runs both concurrently, normalizes their output with
//! [`normalize_digits`], and keeps whichever succeeds first.
//!
//! ```rust,ignore
//! let race = OcrRace::from_config(&config.ocr)?;
//! let serial = race.read_serial(&crop_bytes).await?;
//! ```

mod api;
mod normalize;
mod provider;
mod race;

use async_trait::async_trait;

use crate::error::Result;

pub use api::OcrSpaceClient;
pub use normalize::normalize_digits;
pub use provider::TesseractRecognizer;
pub use race::{first_success, OcrRace};

/// A source of raw recognized text for an image.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Short identifier used in logs and aggregated errors.
    fn name(&self) -> &'static str;

    async fn recognize(&self, image_bytes: &[u8]) -> Result<String>;
}

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};
use tracing::debug;

use crate::config::UploadConfig;
use crate::error::{Result, VouchrError};

const MAX_QUALITY: u8 = 100;
const QUALITY_STEP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    pub max_height: u32,
    pub target_bytes: usize,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            max_height: 720,
            target_bytes: 100 * 1024,
        }
    }
}

impl From<&UploadConfig> for CompressionSettings {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_height: config.max_height,
            target_bytes: config.target_bytes(),
        }
    }
}

/// Shrink a captured frame into a JPEG for Drive.
///
/// Frames taller than `max_height` are scaled down to exactly that height,
/// keeping the aspect ratio. The JPEG is then re-encoded at quality 100, 95,
/// ... 0 until it fits `target_bytes`. The size target is best effort: if
/// even quality 0 is too large, that encoding is returned anyway.
pub fn compress_for_upload(bytes: &[u8], settings: &CompressionSettings) -> Result<Vec<u8>> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| VouchrError::Processing(format!("Failed to read image: {e}")))?
        .decode()
        .map_err(|e| VouchrError::Validation(format!("Unreadable voucher image: {e}")))?;

    let img = fit_height(img, settings.max_height);
    let rgb = img.to_rgb8();

    let mut encoded = Vec::new();
    for quality in (0..=MAX_QUALITY).rev().step_by(QUALITY_STEP) {
        encoded = encode_jpeg(&rgb, quality)?;
        if encoded.len() <= settings.target_bytes {
            debug!(quality, bytes = encoded.len(), "Image compressed within target");
            return Ok(encoded);
        }
    }

    debug!(
        bytes = encoded.len(),
        target = settings.target_bytes,
        "Image still above target at lowest quality"
    );
    Ok(encoded)
}

/// [`compress_for_upload`] on the blocking pool.
pub async fn compress_for_upload_async(
    bytes: Vec<u8>,
    settings: CompressionSettings,
) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || compress_for_upload(&bytes, &settings))
        .await
        .map_err(|e| VouchrError::Processing(format!("Compression task panicked: {e}")))?
}

fn fit_height(img: DynamicImage, max_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if height <= max_height {
        return img;
    }

    let ratio = max_height as f64 / height as f64;
    let new_width = ((width as f64 * ratio).round() as u32).max(1);

    img.resize_exact(
        new_width,
        max_height,
        image::imageops::FilterType::Lanczos3,
    )
}

/// Quality 0 is encoded at the encoder's floor of 1.
fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.max(1));
    encoder
        .encode_image(img)
        .map_err(|e| VouchrError::Processing(format!("Failed to encode JPEG: {e}")))?;
    Ok(output)
}

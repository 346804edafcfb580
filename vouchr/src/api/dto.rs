use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::{Result, VouchrError};
use crate::ingest::{decode_image_buffer, parse_expiry_date, UploadOutcome, UploadRequest};

pub const ONE_FILE_PER_REQUEST: &str = "Each request should contain exactly one file";

/// `POST /api/upload` body, as posted by the capture page.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequestDto {
    #[validate(length(min = 1, max = 20, message = "kodeProduk must be 1-20 characters"))]
    pub kode_produk: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "keterangan must be at most 255 characters"))]
    pub keterangan: String,
    pub tgl_kadaluarsa: String,
    #[serde(default)]
    pub files: Vec<UploadFileDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileDto {
    pub name: String,
    /// Data URL or bare base64.
    pub buffer: String,
}

impl UploadRequestDto {
    /// Everything the pipeline must never retry on is checked here.
    pub fn into_upload_request(self) -> Result<UploadRequest> {
        if self.files.len() != 1 {
            return Err(VouchrError::Validation(ONE_FILE_PER_REQUEST.to_string()));
        }
        self.validate()
            .map_err(|e| VouchrError::Validation(validation_message(&e)))?;

        let expires_at = parse_expiry_date(&self.tgl_kadaluarsa)?;
        let Some(file) = self.files.into_iter().next() else {
            return Err(VouchrError::Validation(ONE_FILE_PER_REQUEST.to_string()));
        };
        if file.name.trim().is_empty() {
            return Err(VouchrError::Validation("File name cannot be empty".to_string()));
        }
        let image = decode_image_buffer(&file.buffer)?;
        if image::guess_format(&image).is_err() {
            return Err(VouchrError::Validation(format!(
                "{} is not a supported image",
                file.name
            )));
        }

        Ok(UploadRequest {
            product_code: self.kode_produk,
            note: self.keterangan,
            expires_at,
            file_name: file.name,
            image,
        })
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                (field.to_string(), message)
            })
        })
        .collect();
    messages.sort();
    messages
        .into_iter()
        .map(|(_, message)| message)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub new_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapturedImagesResponse {
    pub images: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub result: UploadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

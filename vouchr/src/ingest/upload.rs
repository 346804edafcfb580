use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::config::{Config, UploadConfig};
use crate::db::VoucherStore;
use crate::drive::CloudStore;
use crate::error::{Result, VouchrError};
use crate::models::{voucher_number_from_file_name, UploadRecord};
use crate::processing::{compress_for_upload_async, CompressionSettings};
use crate::retry::{retry, RetryPolicy};

const UPLOAD_MIME_TYPE: &str = "image/jpeg";

/// A validated voucher upload, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub product_code: String,
    pub note: String,
    pub expires_at: DateTime<Utc>,
    pub file_name: String,
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub name: String,
    pub drive_link: String,
}

/// Compress, de-duplicate, push to Drive, record.
#[derive(Clone)]
pub struct UploadService {
    store: Arc<dyn VoucherStore>,
    cloud: Arc<dyn CloudStore>,
    auth: Authenticator,
    folder_name: String,
    compression: CompressionSettings,
    pipeline_policy: RetryPolicy,
    upload_policy: RetryPolicy,
}

impl UploadService {
    pub fn new(
        config: &Config,
        store: Arc<dyn VoucherStore>,
        cloud: Arc<dyn CloudStore>,
        auth: Authenticator,
    ) -> Self {
        Self::with_settings(store, cloud, auth, &config.google.folder_name, &config.upload)
    }

    pub fn with_settings(
        store: Arc<dyn VoucherStore>,
        cloud: Arc<dyn CloudStore>,
        auth: Authenticator,
        folder_name: &str,
        upload: &UploadConfig,
    ) -> Self {
        Self {
            store,
            cloud,
            auth,
            folder_name: folder_name.to_string(),
            compression: CompressionSettings::from(upload),
            pipeline_policy: RetryPolicy::pipeline(upload),
            upload_policy: RetryPolicy::drive_upload(upload),
        }
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let voucher_number = voucher_number_from_file_name(&request.file_name);
        let drive_name = format!("{}.jpg", Uuid::new_v4());
        let drive_name = drive_name.as_str();

        let drive_link = retry(self.pipeline_policy, "upload pipeline", move || {
            self.attempt(request, voucher_number, drive_name)
        })
        .await?;

        info!(
            file = %request.file_name,
            voucher = voucher_number,
            link = %drive_link,
            "Voucher uploaded"
        );

        Ok(UploadOutcome {
            name: request.file_name.clone(),
            drive_link,
        })
    }

    async fn attempt(
        &self,
        request: &UploadRequest,
        voucher_number: &str,
        drive_name: &str,
    ) -> Result<String> {
        let (access_token, compressed, exists) = tokio::try_join!(
            self.auth.access_token(),
            compress_for_upload_async(request.image.clone(), self.compression),
            self.store.voucher_exists(voucher_number),
        )?;

        if exists {
            return Err(duplicate(&request.file_name));
        }

        let folder_id = self
            .cloud
            .ensure_folder(&access_token, &self.folder_name)
            .await?;

        let access_token = access_token.as_str();
        let folder_id = folder_id.as_str();
        let compressed = compressed.as_slice();
        let drive_link = retry(self.upload_policy, "drive upload", move || {
            self.publish(access_token, folder_id, drive_name, compressed)
        })
        .await?;

        let record = UploadRecord::new(
            &request.product_code,
            voucher_number,
            &drive_link,
            request.expires_at,
            &request.note,
        );
        let store = self.store.as_ref();
        let record = &record;
        retry(self.pipeline_policy, "voucher insert", move || {
            store.insert_voucher(record)
        })
        .await
        .map_err(|e| match e {
            VouchrError::Duplicate(_) => {
                warn!(
                    voucher = voucher_number,
                    orphan = %drive_link,
                    "Voucher recorded concurrently; uploaded file left orphaned"
                );
                duplicate(&request.file_name)
            }
            other => other,
        })?;

        Ok(drive_link)
    }

    async fn publish(
        &self,
        access_token: &str,
        folder_id: &str,
        drive_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let file = self
            .cloud
            .upload_file(
                access_token,
                folder_id,
                drive_name,
                bytes.to_vec(),
                UPLOAD_MIME_TYPE,
            )
            .await?;
        self.cloud.make_public(access_token, &file.id).await?;
        Ok(file.share_link())
    }
}

fn duplicate(file_name: &str) -> VouchrError {
    VouchrError::Duplicate(format!("Duplicate voucher found: {file_name}"))
}

/// Image payload as sent by the browser: a `data:` URL or bare base64.
pub fn decode_image_buffer(buffer: &str) -> Result<Vec<u8>> {
    let encoded = match buffer.trim().strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| VouchrError::Validation("Malformed data URL".to_string()))?,
        None => buffer.trim(),
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| VouchrError::Validation(format!("Invalid image buffer: {e}")))?;
    if bytes.is_empty() {
        return Err(VouchrError::Validation("Image buffer is empty".to_string()));
    }
    Ok(bytes)
}

/// Expiry date from the form: RFC 3339, a `datetime-local` value, or a
/// bare date (midnight UTC).
pub fn parse_expiry_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(VouchrError::Validation(format!(
        "Invalid tglKadaluarsa: {value}"
    )))
}

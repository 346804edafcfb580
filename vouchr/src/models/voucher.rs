use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status written for every accepted upload.
pub const STATUS_ACTIVE: i32 = 1;

/// One accepted voucher upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadRecord {
    pub product_code: String,
    /// Derived from the uploaded file name, not from OCR.
    pub voucher_number: String,
    pub drive_link: String,
    pub status: i32,
    pub entered_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub note: String,
}

impl UploadRecord {
    pub fn new(
        product_code: impl Into<String>,
        voucher_number: impl Into<String>,
        drive_link: impl Into<String>,
        expires_at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            voucher_number: voucher_number.into(),
            drive_link: drive_link.into(),
            status: STATUS_ACTIVE,
            entered_at: Utc::now(),
            expires_at,
            note: note.into(),
        }
    }
}

/// Voucher number for an uploaded file: the name without a trailing `.png`.
pub fn voucher_number_from_file_name(file_name: &str) -> &str {
    let trimmed = file_name.trim();
    match trimmed.len().checked_sub(4) {
        Some(split) if trimmed.is_char_boundary(split)
            && trimmed[split..].eq_ignore_ascii_case(".png") =>
        {
            &trimmed[..split]
        }
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_active() {
        let expires = Utc::now();
        let record = UploadRecord::new("PLN20", "0841", "https://drive/x", expires, "");
        assert_eq!(record.status, STATUS_ACTIVE);
        assert_eq!(record.expires_at, expires);
        assert!(record.entered_at <= Utc::now());
    }

    #[test]
    fn test_voucher_number_strips_png() {
        assert_eq!(voucher_number_from_file_name("123456.png"), "123456");
        assert_eq!(voucher_number_from_file_name("123456.PNG"), "123456");
        assert_eq!(voucher_number_from_file_name("123456"), "123456");
        assert_eq!(voucher_number_from_file_name("12.png.bak"), "12.png.bak");
        assert_eq!(voucher_number_from_file_name(".png"), "");
        assert_eq!(voucher_number_from_file_name("ab"), "ab");
        assert_eq!(voucher_number_from_file_name("é.png"), "é");
    }
}

//! The two request flows: scanning a voucher at the counter and pushing a
//! captured voucher to Drive.

mod scan;
mod upload;

pub use scan::{ScanOutcome, ScanService, EXTRACTION_FAILED};
pub use upload::{
    decode_image_buffer, parse_expiry_date, UploadOutcome, UploadRequest, UploadService,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored full-frame capture, named after its recognized serial.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapturedImage {
    pub file_name: String,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

//! Voucher capture service.
//!
//! A scan reads the serial off a cropped frame by racing OCR.space against an
//! embedded Tesseract and keeps the full frame as `<serial>.png`. An upload
//! compresses a captured voucher, refuses duplicates, pushes it to Google
//! Drive and records it in libSQL.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod drive;
pub mod error;
pub mod ingest;
pub mod models;
pub mod ocr;
pub mod processing;
pub mod retry;
pub mod storage;

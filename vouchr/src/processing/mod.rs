mod compress;

pub use compress::{compress_for_upload, compress_for_upload_async, CompressionSettings};

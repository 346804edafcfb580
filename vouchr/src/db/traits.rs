use async_trait::async_trait;

use crate::error::Result;
use crate::models::UploadRecord;

/// Persistence for accepted voucher uploads.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Duplicate guard: does a row with this voucher number exist?
    async fn voucher_exists(&self, voucher_number: &str) -> Result<bool>;

    /// Insert a new record. Fails with `Duplicate` if the voucher number is
    /// already stored, even when [`VoucherStore::voucher_exists`] said it was not.
    async fn insert_voucher(&self, record: &UploadRecord) -> Result<()>;

    async fn get_voucher(&self, voucher_number: &str) -> Result<Option<UploadRecord>>;
}

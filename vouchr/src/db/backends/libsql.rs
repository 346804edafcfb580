use async_trait::async_trait;

use crate::db::connection::Database;
use crate::db::repository::VoucherRepository;
use crate::db::traits::VoucherStore;
use crate::error::Result;
use crate::models::UploadRecord;

/// [`VoucherStore`] over libSQL. Each call opens its own connection.
pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoucherStore for LibSqlBackend {
    async fn voucher_exists(&self, voucher_number: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        VoucherRepository::exists(&conn, voucher_number).await
    }

    async fn insert_voucher(&self, record: &UploadRecord) -> Result<()> {
        let conn = self.db.connect()?;
        VoucherRepository::create(&conn, record).await
    }

    async fn get_voucher(&self, voucher_number: &str) -> Result<Option<UploadRecord>> {
        let conn = self.db.connect()?;
        VoucherRepository::get_by_voucher_number(&conn, voucher_number).await
    }
}

use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::{Result, VouchrError};
use crate::models::UploadRecord;

/// SQLITE_CONSTRAINT_UNIQUE
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;
/// SQLITE_CONSTRAINT (primary result code)
const SQLITE_CONSTRAINT: i32 = 19;

pub struct VoucherRepository;

impl VoucherRepository {
    pub async fn exists(conn: &Connection, voucher_number: &str) -> Result<bool> {
        let mut rows = conn
            .query(
                "SELECT 1 FROM vouchers WHERE voucher_number = ?1 LIMIT 1",
                params![voucher_number],
            )
            .await?;

        Ok(rows.next().await?.is_some())
    }

    /// Insert `record`. A unique-index hit on `voucher_number` is reported as
    /// [`VouchrError::Duplicate`].
    pub async fn create(conn: &Connection, record: &UploadRecord) -> Result<()> {
        let result = conn
            .execute(
                r#"
                INSERT INTO vouchers (
                    product_code, voucher_number, drive_link, status,
                    entered_at, expires_at, note
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    record.product_code.clone(),
                    record.voucher_number.clone(),
                    record.drive_link.clone(),
                    record.status,
                    record.entered_at.to_rfc3339(),
                    record.expires_at.to_rfc3339(),
                    record.note.clone(),
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(VouchrError::Duplicate(format!(
                "Duplicate voucher found: {}",
                record.voucher_number
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_voucher_number(
        conn: &Connection,
        voucher_number: &str,
    ) -> Result<Option<UploadRecord>> {
        let mut rows = conn
            .query(
                r#"
                SELECT product_code, voucher_number, drive_link, status,
                       entered_at, expires_at, note
                FROM vouchers WHERE voucher_number = ?1
                "#,
                params![voucher_number],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_record(row: &libsql::Row) -> Result<UploadRecord> {
        Ok(UploadRecord {
            product_code: row.get(0)?,
            voucher_number: row.get(1)?,
            drive_link: row.get(2)?,
            status: row.get(3)?,
            entered_at: parse_timestamp(&row.get::<String>(4)?),
            expires_at: parse_timestamp(&row.get::<String>(5)?),
            note: row.get(6)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn is_unique_violation(error: &libsql::Error) -> bool {
    match error {
        libsql::Error::SqliteFailure(code, message) => {
            *code == SQLITE_CONSTRAINT_UNIQUE
                || (*code & 0xff == SQLITE_CONSTRAINT && message.contains("UNIQUE"))
        }
        other => other.to_string().contains("UNIQUE constraint failed"),
    }
}

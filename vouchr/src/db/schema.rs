use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per voucher uploaded to Drive
        CREATE TABLE IF NOT EXISTS vouchers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_code TEXT NOT NULL,
            voucher_number TEXT NOT NULL,
            drive_link TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 1,
            entered_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT ''
        );

        -- Backstop for concurrent uploads of the same voucher
        CREATE UNIQUE INDEX IF NOT EXISTS idx_vouchers_voucher_number ON vouchers(voucher_number);
        CREATE INDEX IF NOT EXISTS idx_vouchers_product_code ON vouchers(product_code);
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    #[tokio::test]
    async fn test_schema_is_idempotent_and_unique() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn).await.unwrap();
        init_schema(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT \"unique\" FROM pragma_index_list('vouchers') WHERE name = 'idx_vouchers_voucher_number'",
                (),
            )
            .await
            .unwrap();
        let row = rows.next().await.unwrap().expect("unique index exists");
        let unique: i64 = row.get(0).unwrap();
        assert_eq!(unique, 1);
    }
}

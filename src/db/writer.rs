use sqlx::Connection;
use tracing::{info, warn};

use super::Store;
use crate::error::StorageError;
use crate::types::MarketSnapshotRow;

impl Store {
    /// Insert `rows` as new records inside one transaction and return how many
    /// were written.
    ///
    /// A row whose `(coin_id, extracted_at)` already exists, in the table or
    /// earlier in the same batch, rolls back the whole batch and yields
    /// [`StorageError::Conflict`]. Existing rows are never overwritten.
    pub async fn append(&self, rows: &[MarketSnapshotRow]) -> Result<usize, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = insert_sql(self.table());
        let mut conn = self.open_rw().await?;
        let mut tx = conn.begin().await?;

        for row in rows {
            let result = sqlx::query(&sql)
                .bind(&row.coin_id)
                .bind(&row.symbol)
                .bind(&row.name)
                .bind(row.price_usd)
                .bind(row.market_cap_usd)
                .bind(row.volume_usd)
                .bind(row.price_change_24h)
                .bind(&row.extracted_at)
                .execute(&mut *tx)
                .await;

            if let Err(e) = result {
                // Dropping `tx` rolls back everything inserted so far.
                return Err(classify(e, row));
            }
        }

        tx.commit().await?;
        conn.close().await?;

        info!(rows = rows.len(), table = self.table(), "appended snapshot batch");
        Ok(rows.len())
    }
}

fn classify(e: sqlx::Error, row: &MarketSnapshotRow) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            warn!(
                coin_id = %row.coin_id,
                extracted_at = %row.extracted_at,
                "primary key conflict, rejecting batch"
            );
            StorageError::Conflict {
                coin_id: row.coin_id.clone(),
                extracted_at: row.extracted_at.clone(),
            }
        }
        _ => StorageError::Database(e),
    }
}

fn insert_sql(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (
            coin_id, symbol, name, price_usd, market_cap_usd,
            volume_usd, price_change_24h, extracted_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )
}

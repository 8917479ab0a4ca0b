use chrono::{DateTime, Duration, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use tracing::debug;

use super::models::{SummaryStats, TableCountsRow};
use super::Store;
use crate::error::QueryError;
use crate::types::{format_timestamp, MarketSnapshotRow};

const COLUMNS: &str =
    "coin_id, symbol, name, price_usd, market_cap_usd, volume_usd, price_change_24h, extracted_at";

/// Read-only accessors over the snapshot table for viewers and the HTTP API.
#[derive(Debug, Clone)]
pub struct SnapshotQuery {
    store: Store,
}

impl SnapshotQuery {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The `limit` most recently extracted rows across all coins, newest first.
    pub async fn latest(&self, limit: u32) -> Result<Vec<MarketSnapshotRow>, QueryError> {
        let table = self.store.table();
        let sql = format!(
            "SELECT {COLUMNS} FROM {table} ORDER BY extracted_at DESC, coin_id ASC LIMIT ?"
        );

        let mut conn = self.open().await?;
        let rows = sqlx::query_as::<_, MarketSnapshotRow>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        Ok(rows)
    }

    /// Rows for `coin_id` extracted within the last `days` days, oldest first.
    pub async fn history(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<Vec<MarketSnapshotRow>, QueryError> {
        self.history_as_of(coin_id, days, Utc::now()).await
    }

    /// A window reaching past the earliest representable date has no lower
    /// bound and returns the coin's full history.
    pub async fn history_as_of(
        &self,
        coin_id: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<MarketSnapshotRow>, QueryError> {
        // The empty string sorts before every stored timestamp.
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .map(format_timestamp)
            .unwrap_or_default();
        let table = self.store.table();
        let sql = format!(
            "SELECT {COLUMNS} FROM {table} \
             WHERE coin_id = ? AND extracted_at >= ? ORDER BY extracted_at ASC"
        );
        debug!(coin_id, %cutoff, "history query");

        let mut conn = self.open().await?;
        let rows = sqlx::query_as::<_, MarketSnapshotRow>(&sql)
            .bind(coin_id)
            .bind(&cutoff)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        Ok(rows)
    }

    /// Table-wide counts plus the most recent row of every coin.
    pub async fn summary(&self) -> Result<SummaryStats, QueryError> {
        let table = self.store.table();
        let counts_sql = format!(
            r#"
            SELECT COUNT(*) AS total_rows,
                   COUNT(DISTINCT coin_id) AS distinct_coins,
                   MIN(extracted_at) AS first_extracted_at,
                   MAX(extracted_at) AS last_extracted_at
            FROM {table}
            "#
        );
        // (coin_id, extracted_at) is unique, so the join yields one row per coin.
        let latest_sql = format!(
            r#"
            SELECT t.coin_id, t.symbol, t.name, t.price_usd, t.market_cap_usd,
                   t.volume_usd, t.price_change_24h, t.extracted_at
            FROM {table} t
            JOIN (
                SELECT coin_id, MAX(extracted_at) AS newest
                FROM {table}
                GROUP BY coin_id
            ) m ON t.coin_id = m.coin_id AND t.extracted_at = m.newest
            ORDER BY t.market_cap_usd DESC, t.coin_id ASC
            "#
        );

        let mut conn = self.open().await?;
        let counts = sqlx::query_as::<_, TableCountsRow>(&counts_sql)
            .fetch_one(&mut conn)
            .await?;
        let latest_per_coin = sqlx::query_as::<_, MarketSnapshotRow>(&latest_sql)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        Ok(SummaryStats {
            total_rows: counts.total_rows,
            distinct_coins: counts.distinct_coins,
            first_extracted_at: counts.first_extracted_at,
            last_extracted_at: counts.last_extracted_at,
            latest_per_coin,
        })
    }

    async fn open(&self) -> Result<SqliteConnection, QueryError> {
        if !self.store.table_exists().await? {
            return Err(QueryError::NotInitialized {
                path: self.store.path().display().to_string(),
                table: self.store.table().to_string(),
            });
        }
        Ok(self.store.open_ro().await?)
    }
}

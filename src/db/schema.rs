use sqlx::Connection;
use tracing::{debug, info};

use super::Store;
use crate::error::StorageError;

impl Store {
    /// Create the parent directory, database file and snapshot table if any
    /// of them is absent. Safe to call on every run.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path().parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut conn = self.open_rw().await?;
        sqlx::query(&create_table_sql(self.table()))
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        info!(path = %self.path().display(), table = self.table(), "schema ready");
        Ok(())
    }

    /// Whether the snapshot table exists. A missing database file counts as
    /// absent; any other failure to stat the path is an error.
    pub async fn table_exists(&self) -> Result<bool, sqlx::Error> {
        if !tokio::fs::try_exists(self.path()).await? {
            debug!(path = %self.path().display(), "database file not found");
            return Ok(false);
        }

        let mut conn = self.open_ro().await?;
        let found: Option<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(self.table())
                .fetch_optional(&mut conn)
                .await?;
        conn.close().await?;
        Ok(found.is_some())
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            coin_id          TEXT NOT NULL,
            symbol           TEXT NOT NULL,
            name             TEXT NOT NULL,
            price_usd        REAL NOT NULL,
            market_cap_usd   REAL NOT NULL,
            volume_usd       REAL NOT NULL,
            price_change_24h REAL NOT NULL,
            extracted_at     TEXT NOT NULL,
            PRIMARY KEY (coin_id, extracted_at)
        )
        "#
    )
}

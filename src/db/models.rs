use serde::Serialize;

use crate::types::MarketSnapshotRow;

/// Aggregate counts over the whole snapshot table.
#[derive(Debug, sqlx::FromRow)]
pub struct TableCountsRow {
    pub total_rows: i64,
    pub distinct_coins: i64,
    pub first_extracted_at: Option<String>,
    pub last_extracted_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_rows: i64,
    pub distinct_coins: i64,
    pub first_extracted_at: Option<String>,
    pub last_extracted_at: Option<String>,
    /// Most recent row of each coin, one per `coin_id`.
    pub latest_per_coin: Vec<MarketSnapshotRow>,
}

impl SummaryStats {
    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }
}

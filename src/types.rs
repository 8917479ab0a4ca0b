use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One upstream coin record exactly as received, unvalidated.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// `extracted_at` is stored as text in this format (UTC, second resolution).
/// Lexical order equals chronological order, which the store's range queries rely on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ---------------------------------------------------------------------------
// Snapshot row
// ---------------------------------------------------------------------------

/// One observation of one coin at one point in time.
/// `(coin_id, extracted_at)` is the primary key of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MarketSnapshotRow {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub price_usd: f64,
    pub market_cap_usd: f64,
    pub volume_usd: f64,
    /// Signed percentage.
    pub price_change_24h: f64,
    pub extracted_at: String,
}

// ---------------------------------------------------------------------------
// Pipeline state
// ---------------------------------------------------------------------------

/// Logged on every transition; see `Pipeline::stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    SchemaReady,
    Extracted,
    Transformed,
    Loaded,
    Done,
    /// Terminal; reachable from any other stage.
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::SchemaReady => "schema_ready",
            Stage::Extracted => "extracted",
            Stage::Transformed => "transformed",
            Stage::Loaded => "loaded",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

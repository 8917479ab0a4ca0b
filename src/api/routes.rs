use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::config::{DEFAULT_HISTORY_DAYS, DEFAULT_LATEST_LIMIT};
use crate::db::models::SummaryStats;
use crate::db::SnapshotQuery;
use crate::error::Result;
use crate::types::MarketSnapshotRow;

#[derive(Clone)]
pub struct ApiState {
    pub query: SnapshotQuery,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/snapshots/latest", get(get_latest))
        .route("/coins/:id/history", get(get_history))
        .route("/stats/summary", get(get_summary))
        .with_state(state)
}

/// Bind `port` on all interfaces and serve until the process exits.
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LatestQuery {
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_latest(
    State(state): State<ApiState>,
    Query(params): Query<LatestQuery>,
) -> Result<Json<Vec<MarketSnapshotRow>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    Ok(Json(state.query.latest(limit).await?))
}

async fn get_history(
    State(state): State<ApiState>,
    Path(coin_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<MarketSnapshotRow>>> {
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    Ok(Json(state.query.history(&coin_id, days).await?))
}

async fn get_summary(State(state): State<ApiState>) -> Result<Json<SummaryStats>> {
    Ok(Json(state.query.summary().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Store;
    use crate::types::format_timestamp;
    use chrono::{Duration, Utc};

    async fn spawn(query: SnapshotQuery) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(ApiState { query });
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn row(coin_id: &str, extracted_at: String, price: f64) -> MarketSnapshotRow {
        MarketSnapshotRow {
            coin_id: coin_id.to_string(),
            symbol: coin_id[..3].to_string(),
            name: coin_id.to_string(),
            price_usd: price,
            market_cap_usd: price * 100.0,
            volume_usd: 1.0,
            price_change_24h: 0.0,
            extracted_at,
        }
    }

    #[tokio::test]
    async fn serves_latest_history_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(&Config {
            db_path: dir.path().join("prices.db"),
            ..Config::default()
        });
        store.ensure_schema().await.unwrap();
        let t1 = format_timestamp(Utc::now() - Duration::hours(2));
        let t2 = format_timestamp(Utc::now() - Duration::hours(1));
        store
            .append(&[
                row("bitcoin", t1.clone(), 1.0),
                row("ethereum", t1, 2.0),
                row("bitcoin", t2.clone(), 3.0),
            ])
            .await
            .unwrap();
        let base = spawn(SnapshotQuery::new(store)).await;
        let client = reqwest::Client::new();

        let latest: Vec<MarketSnapshotRow> = client
            .get(format!("{base}/snapshots/latest?limit=1"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].extracted_at, t2);

        let history: Vec<MarketSnapshotRow> = client
            .get(format!("{base}/coins/bitcoin/history"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].extracted_at < history[1].extracted_at);

        let resp = client
            .get(format!("{base}/coins/bitcoin/history?days={}", u32::MAX))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let unbounded: Vec<MarketSnapshotRow> = resp.json().await.unwrap();
        assert_eq!(unbounded.len(), 2);

        let summary: serde_json::Value = client
            .get(format!("{base}/stats/summary"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(summary["total_rows"], 3);
        assert_eq!(summary["distinct_coins"], 2);
        assert_eq!(summary["latest_per_coin"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn uninitialized_store_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(&Config {
            db_path: dir.path().join("absent.db"),
            ..Config::default()
        });
        let base = spawn(SnapshotQuery::new(store)).await;

        let resp = reqwest::get(format!("{base}/stats/summary")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 503);
    }
}

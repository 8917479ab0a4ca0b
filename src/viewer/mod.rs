pub mod menu;
pub mod plot;
pub mod table;

use std::io::{self, Write};

use crate::db::SnapshotQuery;
use crate::error::Result;
use crate::types::MarketSnapshotRow;

/// Something that can display a coin's price series. The terminal chart is the
/// real implementation; tests record calls instead.
pub trait ChartSink {
    fn draw(&mut self, coin_id: &str, days: u32, rows: &[MarketSnapshotRow]) -> io::Result<()>;
}

/// The four read operations the viewer offers, in both one-shot and menu form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Latest { limit: u32 },
    History { coin_id: String, days: u32 },
    Stats,
    Plot { coin_id: String, days: u32 },
}

pub struct Viewer<C> {
    query: SnapshotQuery,
    chart: C,
}

impl<C: ChartSink> Viewer<C> {
    pub fn new(query: SnapshotQuery, chart: C) -> Self {
        Self { query, chart }
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    /// Run one command, writing its text output to `out`. Empty results are
    /// reported as messages; only query and I/O failures are errors.
    pub async fn execute<W: Write>(&mut self, cmd: &ViewCommand, out: &mut W) -> Result<()> {
        match cmd {
            ViewCommand::Latest { limit } => {
                let rows = self.query.latest(*limit).await?;
                if rows.is_empty() {
                    writeln!(out, "No data found in the table.")?;
                } else {
                    write!(out, "{}", table::render_rows(&rows))?;
                }
            }
            ViewCommand::History { coin_id, days } => {
                let rows = self.query.history(coin_id, *days).await?;
                if rows.is_empty() {
                    writeln!(out, "{}", no_history(coin_id, *days))?;
                } else {
                    write!(out, "{}", table::render_rows(&rows))?;
                }
            }
            ViewCommand::Stats => {
                let stats = self.query.summary().await?;
                if stats.is_empty() {
                    writeln!(out, "No data available in the database.")?;
                } else {
                    write!(out, "{}", table::render_summary(&stats))?;
                }
            }
            ViewCommand::Plot { coin_id, days } => {
                let rows = self.query.history(coin_id, *days).await?;
                if rows.is_empty() {
                    writeln!(out, "{}", no_history(coin_id, *days))?;
                } else {
                    self.chart.draw(coin_id, *days, &rows)?;
                }
            }
        }
        Ok(())
    }
}

fn no_history(coin_id: &str, days: u32) -> String {
    format!("No data available for {coin_id} in the last {days} days.")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every draw call instead of touching the terminal.
    #[derive(Debug, Default)]
    pub struct RecordingChart {
        pub calls: Vec<(String, u32, usize)>,
    }

    impl ChartSink for RecordingChart {
        fn draw(&mut self, coin_id: &str, days: u32, rows: &[MarketSnapshotRow]) -> io::Result<()> {
            self.calls.push((coin_id.to_string(), days, rows.len()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingChart;
    use super::*;
    use crate::config::Config;
    use crate::db::Store;
    use crate::error::{AppError, QueryError};
    use crate::types::format_timestamp;
    use chrono::{Duration, Utc};

    async fn seeded_viewer(dir: &tempfile::TempDir) -> Viewer<RecordingChart> {
        let store = Store::new(&Config {
            db_path: dir.path().join("prices.db"),
            ..Config::default()
        });
        store.ensure_schema().await.unwrap();
        let recent = format_timestamp(Utc::now() - Duration::hours(1));
        store
            .append(&[
                MarketSnapshotRow {
                    coin_id: "bitcoin".to_string(),
                    symbol: "btc".to_string(),
                    name: "Bitcoin".to_string(),
                    price_usd: 64_000.0,
                    market_cap_usd: 1.2e12,
                    volume_usd: 3.0e10,
                    price_change_24h: 1.5,
                    extracted_at: recent,
                },
            ])
            .await
            .unwrap();
        Viewer::new(SnapshotQuery::new(store), RecordingChart::default())
    }

    async fn run(viewer: &mut Viewer<RecordingChart>, cmd: ViewCommand) -> String {
        let mut out = Vec::new();
        viewer.execute(&cmd, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn latest_and_history_print_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = seeded_viewer(&dir).await;

        let out = run(&mut viewer, ViewCommand::Latest { limit: 10 }).await;
        assert!(out.starts_with("coin_id"));
        assert!(out.contains("bitcoin"));

        let out = run(
            &mut viewer,
            ViewCommand::History { coin_id: "bitcoin".to_string(), days: 7 },
        )
        .await;
        assert_eq!(out.lines().count(), 2);
    }

    #[tokio::test]
    async fn empty_results_print_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = seeded_viewer(&dir).await;

        let out = run(
            &mut viewer,
            ViewCommand::History { coin_id: "dogecoin".to_string(), days: 7 },
        )
        .await;
        assert_eq!(out.trim(), "No data available for dogecoin in the last 7 days.");

        let out = run(
            &mut viewer,
            ViewCommand::Plot { coin_id: "dogecoin".to_string(), days: 3 },
        )
        .await;
        assert!(out.contains("dogecoin in the last 3 days"));
        assert!(viewer.chart().calls.is_empty());
    }

    #[tokio::test]
    async fn plot_hands_rows_to_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = seeded_viewer(&dir).await;

        let out = run(
            &mut viewer,
            ViewCommand::Plot { coin_id: "bitcoin".to_string(), days: 7 },
        )
        .await;
        assert!(out.is_empty());
        assert_eq!(viewer.chart().calls, vec![("bitcoin".to_string(), 7, 1)]);
    }

    #[tokio::test]
    async fn stats_prints_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = seeded_viewer(&dir).await;

        let out = run(&mut viewer, ViewCommand::Stats).await;
        assert!(out.contains("Total records: 1"));
        assert!(out.contains("Coins tracked: 1"));
    }

    #[tokio::test]
    async fn missing_store_surfaces_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(&Config {
            db_path: dir.path().join("absent.db"),
            ..Config::default()
        });
        let mut viewer = Viewer::new(SnapshotQuery::new(store), RecordingChart::default());

        let mut out = Vec::new();
        let err = viewer.execute(&ViewCommand::Stats, &mut out).await.unwrap_err();
        assert!(matches!(err, AppError::Query(QueryError::NotInitialized { .. })));
    }
}

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::Config;
use crate::db::Store;
use crate::error::Result;
use crate::extract::Extractor;
use crate::transform::transform_at;
use crate::types::{format_timestamp, Stage};

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub rows_loaded: usize,
    pub extracted_at: String,
}

/// Runs one extract → transform → load cycle against the configured store.
///
/// Stages execute strictly in order; the first failure ends the run in
/// [`Stage::Failed`] and is returned unchanged. Nothing is retried and data
/// fetched by a failed run is discarded.
pub struct Pipeline {
    cfg: Config,
    store: Store,
    stage: Stage,
}

impl Pipeline {
    pub fn new(cfg: Config) -> Self {
        let store = Store::new(&cfg);
        Self {
            cfg,
            store,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn run(&mut self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit extraction time stamped onto every row.
    pub async fn run_at(&mut self, now: DateTime<Utc>) -> Result<RunReport> {
        info!("Starting ETL pipeline");
        self.stage = Stage::Init;

        match self.execute(now).await {
            Ok(report) => {
                self.advance(Stage::Done);
                info!(
                    rows = report.rows_loaded,
                    extracted_at = %report.extracted_at,
                    "ETL pipeline completed successfully"
                );
                Ok(report)
            }
            Err(e) => {
                error!(last_stage = %self.stage, "Pipeline failed: {e}");
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    async fn execute(&mut self, now: DateTime<Utc>) -> Result<RunReport> {
        self.store.ensure_schema().await?;
        self.advance(Stage::SchemaReady);

        info!(url = %self.cfg.api_url, "Extracting data from API");
        let raw = Extractor::new(&self.cfg)?.fetch().await?;
        self.advance(Stage::Extracted);

        info!(records = raw.len(), "Transforming data");
        let rows = transform_at(&raw, now)?;
        self.advance(Stage::Transformed);

        info!(rows = rows.len(), table = self.store.table(), "Loading data to database");
        let rows_loaded = self.store.append(&rows).await?;
        self.advance(Stage::Loaded);

        Ok(RunReport {
            rows_loaded,
            extracted_at: format_timestamp(now),
        })
    }

    fn advance(&mut self, next: Stage) {
        info!(from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }
}


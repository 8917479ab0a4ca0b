pub mod models;
pub mod query;
pub mod schema;
pub mod writer;

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;

use crate::config::Config;

pub use query::SnapshotQuery;

/// File-backed SQLite store holding every snapshot in a single table.
///
/// Holds no open handle: each operation opens its own connection and closes
/// it before returning.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    table: String,
}

impl Store {
    pub fn new(cfg: &Config) -> Self {
        Self {
            path: cfg.db_path.clone(),
            table: cfg.table_name.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub(crate) async fn open_rw(&self) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .connect()
            .await
    }

    pub(crate) async fn open_ro(&self) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .connect()
            .await
    }
}

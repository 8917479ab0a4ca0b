pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod telemetry;
pub mod transform;
pub mod types;
pub mod viewer;

pub use config::Config;
pub use db::{SnapshotQuery, Store};
pub use error::{AppError, Result};
pub use pipeline::{Pipeline, RunReport};
pub use types::{MarketSnapshotRow, Stage};

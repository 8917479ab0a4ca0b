use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

/// Failure reaching the upstream market-data API.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

/// Raw payload could not be projected onto the canonical row shape.
#[derive(Debug, Error)]
pub enum TransformationError {
    #[error("no data provided for transformation")]
    Empty,

    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index} field `{field}` is not {expected}")]
    InvalidField {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The batch was rolled back; nothing from it was persisted.
    #[error("duplicate snapshot for coin `{coin_id}` at {extracted_at}; batch rejected")]
    Conflict {
        coin_id: String,
        extracted_at: String,
    },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("store not initialized: table `{table}` not found in {path}")]
    NotInitialized { path: String, table: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Transformation failed: {0}")]
    Transformation(#[from] TransformationError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Query(QueryError::NotInitialized { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

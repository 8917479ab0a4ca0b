use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExtractionError;
use crate::types::RawRecord;

/// Pulls one market snapshot from the upstream `/coins/markets` endpoint.
pub struct Extractor {
    client: reqwest::Client,
    url: String,
    params: Vec<(&'static str, String)>,
}

impl Extractor {
    pub fn new(cfg: &Config) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: cfg.api_url.clone(),
            params: cfg.query_params(),
        })
    }

    /// Single GET, no retries. Any network failure, non-2xx status, or body
    /// that is not a JSON array of objects is an error.
    pub async fn fetch(&self) -> Result<Vec<RawRecord>, ExtractionError> {
        let resp = self
            .client
            .get(&self.url)
            .query(&self.params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), "upstream body received");

        let records = parse_snapshot(&body)?;
        info!(records = records.len(), url = %self.url, "fetched market snapshot");
        Ok(records)
    }
}

/// Parse the upstream body into raw records without inspecting their fields.
pub fn parse_snapshot(body: &str) -> Result<Vec<RawRecord>, ExtractionError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::Malformed(format!("invalid JSON: {e}")))?;

    let serde_json::Value::Array(items) = value else {
        return Err(ExtractionError::Malformed(
            "response was not a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ExtractionError::Malformed(format!(
                "element {i} is not an object: {other}"
            ))),
        })
        .collect()
}

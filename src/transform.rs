use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::TransformationError;
use crate::types::{format_timestamp, MarketSnapshotRow, RawRecord};

/// Project raw upstream records onto `MarketSnapshotRow`, stamping every row
/// with the current UTC second.
pub fn transform(raw: &[RawRecord]) -> Result<Vec<MarketSnapshotRow>, TransformationError> {
    transform_at(raw, Utc::now())
}

/// Same as [`transform`] with an explicit extraction time.
///
/// All-or-nothing: the first record with a missing or mistyped field fails
/// the whole batch. Upstream fields outside the projection are dropped.
pub fn transform_at(
    raw: &[RawRecord],
    extracted_at: DateTime<Utc>,
) -> Result<Vec<MarketSnapshotRow>, TransformationError> {
    if raw.is_empty() {
        return Err(TransformationError::Empty);
    }

    let extracted_at = format_timestamp(extracted_at);

    raw.iter()
        .enumerate()
        .map(|(index, record)| -> Result<MarketSnapshotRow, TransformationError> {
            let fields = Fields { index, record };
            Ok(MarketSnapshotRow {
                coin_id: fields.string("id")?,
                symbol: fields.string("symbol")?,
                name: fields.string("name")?,
                price_usd: fields.number("current_price")?,
                market_cap_usd: fields.number("market_cap")?,
                volume_usd: fields.number("total_volume")?,
                price_change_24h: fields.number("price_change_percentage_24h")?,
                extracted_at: extracted_at.clone(),
            })
        })
        .collect()
}

struct Fields<'a> {
    index: usize,
    record: &'a RawRecord,
}

impl Fields<'_> {
    fn get(&self, field: &'static str) -> Result<&Value, TransformationError> {
        self.record
            .get(field)
            .ok_or(TransformationError::MissingField {
                index: self.index,
                field,
            })
    }

    fn string(&self, field: &'static str) -> Result<String, TransformationError> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or(TransformationError::InvalidField {
                index: self.index,
                field,
                expected: "a string",
            })
    }

    // Explicit nulls are rejected too; the row has no nullable columns.
    fn number(&self, field: &'static str) -> Result<f64, TransformationError> {
        self.get(field)?
            .as_f64()
            .ok_or(TransformationError::InvalidField {
                index: self.index,
                field,
                expected: "a number",
            })
    }
}

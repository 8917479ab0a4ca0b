use std::path::PathBuf;

use crate::error::{AppError, Result};

pub const API_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";
pub const VS_CURRENCY: &str = "usd";
pub const ORDER: &str = "market_cap_desc";
pub const PER_PAGE: u32 = 10;
pub const PAGE: u32 = 1;

pub const DB_PATH: &str = "data/crypto_prices.db";
pub const TABLE_NAME: &str = "crypto_market";

/// Upstream request timeout (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Viewer defaults.
pub const DEFAULT_LATEST_LIMIT: u32 = 10;
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    /// Market-data endpoint (API_URL)
    pub api_url: String,
    pub vs_currency: String,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
    pub request_timeout_secs: u64,
    /// SQLite file backing the store (DB_PATH)
    pub db_path: PathBuf,
    /// Table holding every snapshot row (TABLE_NAME). Interpolated into SQL,
    /// so it is restricted to a plain identifier.
    pub table_name: String,
    pub log_level: String,
    /// Port for the read-only HTTP API (API_PORT)
    pub api_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            vs_currency: VS_CURRENCY.to_string(),
            order: ORDER.to_string(),
            per_page: PER_PAGE,
            page: PAGE,
            sparkline: false,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            db_path: PathBuf::from(DB_PATH),
            table_name: TABLE_NAME.to_string(),
            log_level: "info".to_string(),
            api_port: 3000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            api_url: lookup("API_URL").unwrap_or(defaults.api_url),
            vs_currency: lookup("VS_CURRENCY").unwrap_or(defaults.vs_currency),
            order: defaults.order,
            per_page: parse_or(&lookup, "PER_PAGE", defaults.per_page)?,
            page: defaults.page,
            sparkline: defaults.sparkline,
            request_timeout_secs: parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            db_path: lookup("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            table_name: lookup("TABLE_NAME").unwrap_or(defaults.table_name),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            api_port: parse_or(&lookup, "API_PORT", defaults.api_port)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_sql_identifier(&self.table_name) {
            return Err(AppError::Config(format!(
                "TABLE_NAME must be a plain SQL identifier, got {:?}",
                self.table_name
            )));
        }
        if self.per_page == 0 {
            return Err(AppError::Config("PER_PAGE must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Fixed query parameters sent with every upstream request.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", self.order.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", self.sparkline.to_string()),
        ]
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}

fn is_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

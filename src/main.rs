use tracing::error;

use crypto_etl::telemetry::init_tracing;
use crypto_etl::{Config, Pipeline};

/// One extract-transform-load cycle. Periodic runs are left to an external
/// scheduler such as cron.
#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&cfg.log_level);

    let mut pipeline = Pipeline::new(cfg);
    if let Err(e) = pipeline.run().await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

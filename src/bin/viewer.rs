//! Crypto ETL data viewer: latest rows, coin history, summary statistics,
//! price plots, an interactive menu, or a read-only JSON API over the store.

use std::io;

use clap::{ArgGroup, CommandFactory, Parser};
use tracing::error;

use crypto_etl::api::{self, ApiState};
use crypto_etl::config::DEFAULT_HISTORY_DAYS;
use crypto_etl::telemetry::init_tracing;
use crypto_etl::viewer::menu::run_menu;
use crypto_etl::viewer::plot::TerminalChart;
use crypto_etl::viewer::{ViewCommand, Viewer};
use crypto_etl::{Config, Result, SnapshotQuery, Store};

#[derive(Parser)]
#[command(name = "viewer", about = "Crypto ETL data viewer")]
#[command(group(
    ArgGroup::new("mode")
        .args(["latest", "history", "plot", "stats", "interactive", "serve"])
        .multiple(false)
))]
struct Cli {
    /// Show the latest N records.
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "10")]
    latest: Option<u32>,

    /// Show history for a coin ID (e.g. bitcoin).
    #[arg(long, value_name = "COIN")]
    history: Option<String>,

    /// Plot price history for a coin ID.
    #[arg(long, value_name = "COIN")]
    plot: Option<String>,

    /// Number of days of history to show or plot.
    #[arg(long, default_value_t = DEFAULT_HISTORY_DAYS)]
    days: u32,

    /// Show summary statistics.
    #[arg(long, default_value_t = false)]
    stats: bool,

    /// Launch the interactive menu.
    #[arg(long, default_value_t = false)]
    interactive: bool,

    /// Serve the read-only JSON API on API_PORT.
    #[arg(long, default_value_t = false)]
    serve: bool,
}

impl Cli {
    fn view_command(&self) -> Option<ViewCommand> {
        if let Some(limit) = self.latest {
            return Some(ViewCommand::Latest { limit });
        }
        if let Some(coin_id) = &self.history {
            return Some(ViewCommand::History {
                coin_id: coin_id.to_lowercase(),
                days: self.days,
            });
        }
        if let Some(coin_id) = &self.plot {
            return Some(ViewCommand::Plot {
                coin_id: coin_id.to_lowercase(),
                days: self.days,
            });
        }
        self.stats.then_some(ViewCommand::Stats)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // Keep table output clean unless RUST_LOG asks for more.
    init_tracing(if cli.serve { cfg.log_level.as_str() } else { "warn" });

    if let Err(e) = run(cli, cfg).await {
        error!("Viewer error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, cfg: Config) -> Result<()> {
    let query = SnapshotQuery::new(Store::new(&cfg));

    if cli.serve {
        return api::serve(ApiState { query }, cfg.api_port).await;
    }

    let mut viewer = Viewer::new(query, TerminalChart);
    let mut stdout = io::stdout();

    if cli.interactive {
        return run_menu(&mut viewer, io::stdin().lock(), &mut stdout).await;
    }

    match cli.view_command() {
        Some(cmd) => viewer.execute(&cmd, &mut stdout).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

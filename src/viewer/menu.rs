use std::io::{BufRead, Write};

use tracing::warn;

use super::{ChartSink, ViewCommand, Viewer};
use crate::config::{DEFAULT_HISTORY_DAYS, DEFAULT_LATEST_LIMIT};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Latest,
    History,
    Stats,
    Plot,
    Exit,
}

pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Latest),
        "2" => Some(MenuChoice::History),
        "3" => Some(MenuChoice::Stats),
        "4" => Some(MenuChoice::Plot),
        "5" => Some(MenuChoice::Exit),
        _ => None,
    }
}

const MENU: &str = "\n=== Crypto Data Viewer ===
1. View latest data
2. View coin history
3. Show summary statistics
4. Plot coin price history
5. Exit";

/// Interactive loop: read one choice per line from `input`, dispatch it, and
/// repeat until `5` or end of input. Failed commands are reported and the
/// loop continues.
///
/// Input is read with blocking calls, so the menu must not share its runtime
/// with other tasks.
pub async fn run_menu<C, R, W>(viewer: &mut Viewer<C>, input: R, out: &mut W) -> Result<()>
where
    C: ChartSink,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(&mut lines, out, "Enter your choice (1-5): ")? else {
            break;
        };

        let cmd = match parse_choice(&choice) {
            Some(MenuChoice::Exit) => break,
            Some(MenuChoice::Latest) => {
                let text = "How many records to show? (default 10): ";
                let Some(raw) = prompt(&mut lines, out, text)? else {
                    break;
                };
                ViewCommand::Latest {
                    limit: number_or_default(&raw, DEFAULT_LATEST_LIMIT, out)?,
                }
            }
            Some(MenuChoice::History) => {
                let Some((coin_id, days)) = coin_and_days(&mut lines, out)? else {
                    break;
                };
                ViewCommand::History { coin_id, days }
            }
            Some(MenuChoice::Plot) => {
                let Some((coin_id, days)) = coin_and_days(&mut lines, out)? else {
                    break;
                };
                ViewCommand::Plot { coin_id, days }
            }
            Some(MenuChoice::Stats) => ViewCommand::Stats,
            None => {
                writeln!(out, "Invalid choice. Please try again.")?;
                continue;
            }
        };

        if let Err(e) = viewer.execute(&cmd, out).await {
            warn!(?cmd, "viewer command failed: {e}");
            writeln!(out, "Error: {e}")?;
        }
    }

    Ok(())
}

fn coin_and_days<B, W>(lines: &mut std::io::Lines<B>, out: &mut W) -> Result<Option<(String, u32)>>
where
    B: BufRead,
    W: Write,
{
    let Some(coin_id) = prompt(lines, out, "Enter coin ID (e.g., 'bitcoin'): ")? else {
        return Ok(None);
    };
    let Some(raw) = prompt(lines, out, "How many days? (default 7): ")? else {
        return Ok(None);
    };
    let days = number_or_default(&raw, DEFAULT_HISTORY_DAYS, out)?;
    Ok(Some((coin_id.trim().to_lowercase(), days)))
}

/// Write `text`, flush, and read one line. `None` means end of input.
fn prompt<B, W>(lines: &mut std::io::Lines<B>, out: &mut W, text: &str) -> Result<Option<String>>
where
    B: BufRead,
    W: Write,
{
    write!(out, "{text}")?;
    out.flush()?;
    Ok(lines.next().transpose()?)
}

fn number_or_default<W: Write>(raw: &str, default: u32, out: &mut W) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    match raw.parse::<u32>() {
        Ok(n) => Ok(n),
        Err(_) => {
            writeln!(out, "Not a number: {raw:?}, using {default}.")?;
            Ok(default)
        }
    }
}

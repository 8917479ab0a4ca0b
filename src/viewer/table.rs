use crate::db::models::SummaryStats;
use crate::types::MarketSnapshotRow;

const NAME_WIDTH: usize = 20;

const HEADERS: [&str; 8] = [
    "coin_id",
    "symbol",
    "name",
    "price_usd",
    "market_cap_usd",
    "volume_usd",
    "price_change_24h",
    "extracted_at",
];

// Numeric columns are right-aligned.
const NUMERIC: [bool; 8] = [false, false, false, true, true, true, true, false];

/// Fixed-width text table, one line per row, header first.
pub fn render_rows(rows: &[MarketSnapshotRow]) -> String {
    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|r| {
            [
                r.coin_id.clone(),
                r.symbol.clone(),
                truncate(&r.name, NAME_WIDTH),
                format_price(r.price_usd),
                format!("{:.0}", r.market_cap_usd),
                format!("{:.0}", r.volume_usd),
                format_change(r.price_change_24h),
                r.extracted_at.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .zip(NUMERIC.iter())
        .map(|((cell, &w), &numeric)| {
            if numeric {
                format!("{cell:>w$}")
            } else {
                format!("{cell:<w$}")
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Summary block: totals, date range, and the latest price of every coin.
pub fn render_summary(stats: &SummaryStats) -> String {
    let first = stats.first_extracted_at.as_deref().unwrap_or("—");
    let last = stats.last_extracted_at.as_deref().unwrap_or("—");

    let mut out = String::new();
    out.push_str("=== Summary Statistics ===\n");
    out.push_str(&format!("Total records: {}\n", stats.total_rows));
    out.push_str(&format!("Date range: {first} to {last}\n"));
    out.push_str(&format!("Coins tracked: {}\n", stats.distinct_coins));
    out.push_str("\n=== Latest Prices ===\n");

    let id_w = stats
        .latest_per_coin
        .iter()
        .map(|r| r.coin_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("coin_id".len());
    let sym_w = stats
        .latest_per_coin
        .iter()
        .map(|r| r.symbol.chars().count())
        .max()
        .unwrap_or(0)
        .max("symbol".len());

    out.push_str(&format!(
        "{:<id_w$}  {:<sym_w$}  {:>14}  {:>16}\n",
        "coin_id", "symbol", "price_usd", "price_change_24h"
    ));
    for r in &stats.latest_per_coin {
        out.push_str(&format!(
            "{:<id_w$}  {:<sym_w$}  {:>14}  {:>16}\n",
            r.coin_id,
            r.symbol,
            format_price(r.price_usd),
            format_change(r.price_change_24h),
        ));
    }
    out
}

/// Two decimals for ordinary prices, more for sub-dollar coins.
pub fn format_price(v: f64) -> String {
    if v.abs() >= 1.0 || v == 0.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.6}")
    }
}

pub fn format_change(v: f64) -> String {
    format!("{v:+.2}%")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(coin_id: &str, name: &str, price: f64) -> MarketSnapshotRow {
        MarketSnapshotRow {
            coin_id: coin_id.to_string(),
            symbol: "sym".to_string(),
            name: name.to_string(),
            price_usd: price,
            market_cap_usd: 1_234_567.8,
            volume_usd: 99.4,
            price_change_24h: -2.5,
            extracted_at: "2024-05-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn table_has_header_and_aligned_rows() {
        let out = render_rows(&[
            row("bitcoin", "Bitcoin", 64_000.0),
            row("shiba-inu", "Shiba Inu", 0.0000251),
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("coin_id"));
        assert!(lines[0].ends_with("extracted_at"));
        assert!(lines[1].contains("64000.00"));
        assert!(lines[1].contains("1234568"));
        assert!(lines[1].contains("-2.50%"));
        assert!(lines[2].contains("0.000025"));
        // Every row ends with the timestamp column at the same offset.
        let offset = lines[1].find("2024-05-01").unwrap();
        assert_eq!(lines[2].find("2024-05-01").unwrap(), offset);
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("Wrapped Liquid Staked Ether 2.0", 10), "Wrapped L…");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn summary_lists_counts_and_latest() {
        let stats = SummaryStats {
            total_rows: 3,
            distinct_coins: 2,
            first_extracted_at: Some("2024-05-01 10:00:00".to_string()),
            last_extracted_at: Some("2024-05-01 11:00:00".to_string()),
            latest_per_coin: vec![
                row("bitcoin", "Bitcoin", 61_000.0),
                row("ethereum", "Ethereum", 3_000.0),
            ],
        };
        let out = render_summary(&stats);
        assert!(out.contains("Total records: 3"));
        assert!(out.contains("Date range: 2024-05-01 10:00:00 to 2024-05-01 11:00:00"));
        assert!(out.contains("Coins tracked: 2"));
        assert!(out.contains("61000.00"));
        assert_eq!(out.lines().filter(|l| l.starts_with("ethereum")).count(), 1);
    }
}

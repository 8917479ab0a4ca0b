use std::io;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};

use super::table::format_price;
use super::ChartSink;
use crate::types::{parse_timestamp, MarketSnapshotRow};

/// Full-screen price chart in the alternate screen; any key returns.
#[derive(Debug, Default)]
pub struct TerminalChart;

impl ChartSink for TerminalChart {
    fn draw(&mut self, coin_id: &str, days: u32, rows: &[MarketSnapshotRow]) -> io::Result<()> {
        enable_raw_mode()?;
        let _raw = RestoreOnDrop(|| {
            let _ = disable_raw_mode();
        });
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Dropped before `_raw`, so the screen is left while still in raw mode.
        let _screen = RestoreOnDrop(|| {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        });
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = wait_for_key(&mut terminal, coin_id, days, rows);
        terminal.show_cursor()?;
        result
    }
}

/// Runs the closure when dropped, including on early `?` returns.
struct RestoreOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.0)()
    }
}

fn wait_for_key(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    coin_id: &str,
    days: u32,
    rows: &[MarketSnapshotRow],
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_price_chart(f, coin_id, days, rows))?;
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(()),
            // Resize and other events just redraw.
            _ => {}
        }
    }
}

/// `(unix seconds, price_usd)` for every row with a parseable timestamp.
pub fn price_points(rows: &[MarketSnapshotRow]) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|r| {
            parse_timestamp(&r.extracted_at).map(|t| (t.timestamp() as f64, r.price_usd))
        })
        .collect()
}

pub fn chart_title(coin_id: &str, days: u32) -> String {
    let mut chars = coin_id.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!(" {name} Price History (Last {days} Days) ")
}

pub fn render_price_chart(f: &mut Frame, coin_id: &str, days: u32, rows: &[MarketSnapshotRow]) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let title = Span::styled(
        chart_title(coin_id, days),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let points = price_points(rows);
    if points.is_empty() {
        f.render_widget(Paragraph::new("No data to plot.").block(block), chunks[0]);
    } else {
        let x_bounds = padded_bounds(points.iter().map(|p| p.0), 0.0);
        let y_bounds = padded_bounds(points.iter().map(|p| p.1), 0.05);

        let first = rows.first().map_or("", |r| r.extracted_at.as_str());
        let last = rows.last().map_or("", |r| r.extracted_at.as_str());

        let dataset = Dataset::default()
            .name("price_usd")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Date (UTC)")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(x_bounds)
                    .labels(vec![first.to_string(), last.to_string()]),
            )
            .y_axis(
                Axis::default()
                    .title("Price (USD)")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(y_bounds)
                    .labels(vec![
                        format_price(y_bounds[0]),
                        format_price((y_bounds[0] + y_bounds[1]) / 2.0),
                        format_price(y_bounds[1]),
                    ]),
            );
        f.render_widget(chart, chunks[0]);
    }

    let footer = Paragraph::new(Span::styled(
        format!(" {} points  │  press any key to return", points.len()),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(footer, chunks[1]);
}

/// Min/max of `values` widened by `pad` of the range. A flat series gets a
/// unit-wide window so the axis never collapses.
fn padded_bounds(values: impl Iterator<Item = f64>, pad: f64) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi - lo <= f64::EPSILON {
        return [lo - 0.5, hi + 0.5];
    }
    let margin = (hi - lo) * pad;
    [lo - margin, hi + margin]
}

//! Vitals view.
//!
//! Shows the latest value of every vital with a sparkline over the working
//! window, and the recent readings as a table.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use vitalwatch_types::{AlertKind, Reading, Vital};

use super::{format_value, format_with_unit, ABSENT};
use crate::app::App;
use crate::data::{trend, VitalStatus};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.frame else {
        let paragraph = Paragraph::new(" Waiting for the first poll...")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(bordered(app, " Vitals "));
        frame.render_widget(paragraph, area);
        return;
    };

    let window = data.window(app.window);

    let chunks = Layout::vertical([
        Constraint::Length(Vital::NUMERIC.len() as u16 + 3), // Latest values
        Constraint::Min(4),                                // Recent readings
    ])
    .split(area);

    render_latest(frame, app, data.latest(), window, chunks[0]);
    render_recent(frame, app, window, chunks[1]);
}

fn bordered<'a>(app: &App, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Status of one vital of a reading, for colouring.
fn status_of(app: &App, reading: &Reading, vital: Vital) -> VitalStatus {
    match AlertKind::for_vital(vital) {
        Some(kind) => app.thresholds.status(kind, reading.value(vital)),
        None if reading.blood_pressure.is_some() => VitalStatus::Normal,
        None => VitalStatus::Absent,
    }
}

fn render_latest(
    frame: &mut Frame,
    app: &App,
    latest: Option<&Reading>,
    window: &[Reading],
    area: Rect,
) {
    let title = match latest {
        Some(reading) => format!(
            " Latest reading {} ",
            reading.timestamp.format("%Y-%m-%d %H:%M:%S")
        ),
        None => " Latest reading (none) ".to_string(),
    };

    let mut lines = vec![Line::from("")];
    for vital in Vital::NUMERIC {
        let value = latest.and_then(|r| r.value(vital));
        let status = latest
            .map(|r| status_of(app, r, vital))
            .unwrap_or(VitalStatus::Absent);
        let sparkline = render_sparkline(&trend::levels(&trend::series(window, vital)));

        lines.push(Line::from(vec![
            Span::raw(format!(" {:<18}", vital.label())),
            Span::styled(
                format!("{:>18}", format_with_unit(vital, value)),
                app.theme.status_style(status),
            ),
            Span::raw("  "),
            Span::styled(sparkline, Style::default().fg(app.theme.highlight)),
            Span::raw("  "),
            Span::styled(status.symbol(), app.theme.status_style(status)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(bordered(app, title)), area);
}

fn render_recent(frame: &mut Frame, app: &App, window: &[Reading], area: Rect) {
    let header = Row::new(
        std::iter::once(Cell::from("Time"))
            .chain(Vital::ALL.iter().map(|v| Cell::from(v.label())))
            .collect::<Vec<_>>(),
    )
    .height(1)
    .style(app.theme.header);

    // Newest first
    let rows: Vec<Row> = window
        .iter()
        .rev()
        .map(|reading| {
            let mut cells = vec![Cell::from(reading.timestamp.format("%H:%M:%S").to_string())];
            for vital in Vital::ALL {
                let text = match vital {
                    Vital::BloodPressure => reading
                        .blood_pressure
                        .clone()
                        .unwrap_or_else(|| ABSENT.to_string()),
                    _ => format_value(vital, reading.value(vital)),
                };
                let style = app.theme.status_style(status_of(app, reading, vital));
                cells.push(Cell::from(text).style(style));
            }
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let title = format!(" Recent readings ({}) ", window.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(app, title));

    frame.render_widget(table, area);
}

/// Render levels as bar characters; gaps become spaces.
fn render_sparkline(levels: &[Option<u8>]) -> String {
    if levels.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    levels
        .iter()
        .map(|level| match level {
            Some(v) => SPARKLINE_CHARS[(*v).min(7) as usize],
            None => ' ',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sparkline_gaps() {
        assert_eq!(render_sparkline(&[Some(0), None, Some(7)]), "▁ █");
        assert_eq!(render_sparkline(&[]), "        ");
    }
}

//! Alerts view rendering.
//!
//! Lists every recorded alert event, newest first.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the alert log with the selected row highlighted.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app.alerts();

    let block = Block::default()
        .title(format!(" Alerts ({}) ", alerts.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if alerts.is_empty() {
        let paragraph = Paragraph::new(" No alerts recorded")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![Cell::from("Detected"), Cell::from("Alert")])
        .height(1)
        .style(app.theme.header);

    let alert_style = Style::default().fg(app.theme.alert);
    let rows: Vec<Row> = alerts
        .iter()
        .map(|event| {
            Row::new(vec![
                Cell::from(event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(event.message.clone()).style(alert_style),
            ])
        })
        .collect();

    let widths = [Constraint::Length(21), Constraint::Fill(1)];

    let selected = app.selected_alert_index.min(alerts.len() - 1);
    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title_bottom(format!(" [{}/{}] ", selected + 1, alerts.len())))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

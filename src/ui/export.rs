//! Export view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.frame.as_ref().map(|f| f.readings.len()).unwrap_or(0);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("   File:     "),
            Span::styled(
                app.export_path.display().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!("   Readings: {}", rows)),
        Line::from(""),
    ];

    if rows == 0 {
        lines.push(Line::from(Span::styled(
            "   Nothing to export yet",
            Style::default().fg(app.theme.muted),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "   Press Enter to export",
            Style::default().fg(app.theme.highlight),
        )));
    }

    let block = Block::default()
        .title(" Export to CSV ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

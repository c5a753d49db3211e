//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;
use crate::pipeline::NoticeKind;

/// Render the header bar with connectivity and alert indicator.
///
/// Displays: connectivity, staleness of the newest reading, source, alerts.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " VITALWATCH ",
        Style::default().add_modifier(Modifier::BOLD),
    )];

    match app.frame {
        Some(ref data) => {
            let status = &data.connectivity;
            spans.push(Span::raw("│ "));
            spans.push(Span::styled(
                format!("● {}", status.label()),
                app.theme.connectivity_style(status),
            ));
            let staleness = match status.staleness_seconds {
                Some(secs) if secs >= 0.0 => {
                    let age = std::time::Duration::from_secs_f64(secs);
                    format!(" (last reading {} ago)", format_duration(age))
                }
                Some(_) => " (last reading in the future)".to_string(),
                None => " (no readings)".to_string(),
            };
            spans.push(Span::styled(staleness, Style::default().add_modifier(Modifier::DIM)));
        }
        None => spans.push(Span::raw("| Loading...")),
    }

    spans.push(Span::raw(format!(" │ {} ", app.source_description())));

    if app.has_unviewed_alerts() {
        spans.push(Span::raw("│ "));
        spans.push(Span::styled(
            "Active Alerts!",
            Style::default()
                .fg(app.theme.alert)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Title drawn for a view's tab.
pub fn tab_title(view: View) -> String {
    format!(" {}:{} ", view.index() + 1, view.label())
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL.iter().map(|view| Line::from(tab_title(*view))).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last update, problems from the last tick, controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let Some(ref data) = app.frame else {
        let paragraph = Paragraph::new(" Loading... | q:quit")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    };

    // Problems take over the bar; persistence failures first
    let notice = data
        .notices
        .iter()
        .find(|n| n.kind == NoticeKind::Persistence)
        .or_else(|| data.notices.first());
    if let Some(notice) = notice {
        let paragraph = Paragraph::new(format!(" {} | r:retry q:quit", notice.message)).style(
            Style::default()
                .fg(app.theme.alert)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Vitals => "r:refresh Tab:switch ?:help q:quit",
        View::Alerts => "↑↓:scroll Tab:switch ?:help q:quit",
        View::BloodPressure => "↑↓:adjust ←→:field Enter:submit Tab:switch q:quit",
        View::Export => "Enter:export Tab:switch ?:help q:quit",
    };

    let status = format!(
        " Tick {} at {} | {} readings | {}",
        data.tick,
        data.updated_at.format("%H:%M:%S"),
        data.readings.len(),
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/S-Tab   Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Scroll alerts"),
        Line::from("  Esc         Back to vitals"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Blood Pressure Entry",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→         Systolic/diastolic"),
        Line::from("  ↑/↓ +/-     Adjust by 1"),
        Line::from("  PgUp/PgDn   Adjust by 10"),
        Line::from("  Enter       Submit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to CSV"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

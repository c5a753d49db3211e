//! Blood-pressure entry view.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use vitalwatch_types::{DIASTOLIC_RANGE, SYSTOLIC_RANGE};

use super::ABSENT;
use crate::app::{App, BpField};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Manual Blood Pressure Entry ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Spacer
        Constraint::Length(1), // Systolic
        Constraint::Length(1), // Diastolic
        Constraint::Length(1), // Spacer
        Constraint::Length(1), // Preview
        Constraint::Length(1), // Last measured
        Constraint::Min(0),
    ])
    .split(inner);

    let form = &app.bp_form;
    let systolic = field_line(
        app,
        "Systolic",
        form.systolic,
        *SYSTOLIC_RANGE.start(),
        *SYSTOLIC_RANGE.end(),
        form.focus == BpField::Systolic,
    );
    let diastolic = field_line(
        app,
        "Diastolic",
        form.diastolic,
        *DIASTOLIC_RANGE.start(),
        *DIASTOLIC_RANGE.end(),
        form.focus == BpField::Diastolic,
    );
    frame.render_widget(Paragraph::new(systolic), chunks[1]);
    frame.render_widget(Paragraph::new(diastolic), chunks[2]);

    let preview = Line::from(vec![
        Span::raw("   Will submit: "),
        Span::styled(
            format!("{}/{} mmHg", form.systolic, form.diastolic),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  [Enter]", Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(Paragraph::new(preview), chunks[4]);

    let last = app
        .frame
        .as_ref()
        .and_then(|f| f.last_blood_pressure().map(str::to_string))
        .unwrap_or_else(|| ABSENT.to_string());
    let last = Paragraph::new(format!("   Last measured: {}", last))
        .style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(last, chunks[5]);
}

fn field_line(app: &App, label: &str, value: u16, min: u16, max: u16, focused: bool) -> Line<'static> {
    let marker = if focused { " ▶ " } else { "   " };
    let value_style = if focused {
        app.theme.selected.fg(app.theme.highlight)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker.to_string(), Style::default().fg(app.theme.highlight)),
        Span::raw(format!("{:<10}", label)),
        Span::styled(format!(" {:>3} ", value), value_style),
        Span::styled(
            format!("  mmHg ({}-{})", min, max),
            Style::default().fg(app.theme.muted),
        ),
    ])
}

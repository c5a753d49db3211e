use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, BpField, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // The BP form claims the arrow keys and Enter
    if app.current_view == View::BloodPressure && handle_bp_form_input(app, key) {
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Vitals),
        KeyCode::Char('2') => app.set_view(View::Alerts),
        KeyCode::Char('3') => app.set_view(View::BloodPressure),
        KeyCode::Char('4') => app.set_view(View::Export),

        // Navigation (alerts list)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_n(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_n(1),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Export view confirms with Enter
        KeyCode::Enter if app.current_view == View::Export => app.export_and_report(),

        // Go back to the vitals view
        KeyCode::Esc | KeyCode::Backspace => app.set_view(View::Vitals),

        // Refresh now
        KeyCode::Char('r') => app.refresh(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => app.export_and_report(),

        _ => {}
    }
}

/// Handle keys owned by the BP entry form. Returns true if the key was used.
fn handle_bp_form_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+') => app.bp_form.step(1),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-') => app.bp_form.step(-1),
        KeyCode::PageUp => app.bp_form.step(10),
        KeyCode::PageDown => app.bp_form.step(-10),
        KeyCode::Left | KeyCode::Char('h') => app.bp_form.focus = BpField::Systolic,
        KeyCode::Right | KeyCode::Char('l') => app.bp_form.focus = BpField::Diastolic,
        KeyCode::Char(' ') => app.bp_form.toggle_focus(),
        KeyCode::Enter => app.submit_and_report(),
        _ => return false,
    }
    true
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel
        MouseEventKind::ScrollUp => {
            if app.current_view == View::BloodPressure {
                app.bp_form.step(1);
            } else {
                app.select_prev_n(1);
            }
        }
        MouseEventKind::ScrollDown => {
            if app.current_view == View::BloodPressure {
                app.bp_form.step(-1);
            } else {
                app.select_next_n(1);
            }
        }

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            if let Some(view) = tab_at(mouse.column) {
                app.set_view(view);
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.set_view(View::Vitals),

        _ => {}
    }
}

/// Map a column on the tab bar to the tab drawn there.
///
/// Mirrors the layout of `ui::common::render_tabs`: each title is padded by
/// one column on both sides and followed by a one-column divider.
fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let width = crate::ui::common::tab_title(view).chars().count() as u16 + 2;
        if column < start + width {
            return Some(view);
        }
        start += width + 1;
    }
    None
}

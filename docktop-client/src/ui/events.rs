//! Terminal event handling for the dashboard loop.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the dashboard loop should do with a terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Terminal resized to (columns, rows).
    Resize(u16, u16),
    Ignore,
}

/// Checks if the event is a quit command: `q`, `Esc` or `Ctrl-C`.
pub fn is_quit_event(event: &Event) -> bool {
    match event {
        Event::Key(KeyEvent {
            code, modifiers, kind, ..
        }) if *kind != KeyEventKind::Release => match code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
            _ => false,
        },
        _ => false,
    }
}

pub fn classify(event: &Event) -> Action {
    if is_quit_event(event) {
        return Action::Quit;
    }
    match event {
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::Ignore,
    }
}

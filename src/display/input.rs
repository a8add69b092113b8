//! Mapping of terminal events to [`InputEvent`]s.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{InputEvent, RawEvent};

/// Translate a crossterm event.
///
/// - Up: previous effect
/// - Down: next effect
/// - Esc, Ctrl+C: quit
///
/// Everything else becomes [`InputEvent::Other`]. Plain presses of the
/// common keys get their own [`RawEvent`] variant; any other key,
/// including releases and modifier chords, arrives as [`RawEvent::Key`].
pub fn map_event(event: &Event) -> Option<InputEvent> {
    let raw = match event {
        Event::Key(key) => return Some(map_key(key)),
        Event::Mouse(mouse) => RawEvent::Mouse(*mouse),
        Event::FocusGained => RawEvent::Focus { gained: true },
        Event::FocusLost => RawEvent::Focus { gained: false },
        Event::Resize(columns, rows) => RawEvent::Resize {
            columns: *columns,
            rows: *rows,
        },
        _ => RawEvent::Unrecognized,
    };
    Some(InputEvent::Other(raw))
}

fn map_key(key: &KeyEvent) -> InputEvent {
    let pressed = key.kind != KeyEventKind::Release;
    let chord = key.modifiers.intersects(!KeyModifiers::SHIFT);

    if pressed && key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') | KeyCode::Char('C') = key.code {
            return InputEvent::Quit;
        }
    }

    if pressed && !chord {
        let raw = match key.code {
            KeyCode::Up => return InputEvent::NavigatePrevious,
            KeyCode::Down => return InputEvent::NavigateNext,
            KeyCode::Esc => return InputEvent::Quit,
            KeyCode::Char(c) => Some(RawEvent::Char(c)),
            KeyCode::Left => Some(RawEvent::Left),
            KeyCode::Right => Some(RawEvent::Right),
            KeyCode::Enter => Some(RawEvent::Enter),
            KeyCode::Tab => Some(RawEvent::Tab),
            KeyCode::Backspace => Some(RawEvent::Backspace),
            KeyCode::F(n) => Some(RawEvent::Function(n)),
            _ => None,
        };
        if let Some(raw) = raw {
            return InputEvent::Other(raw);
        }
    }

    InputEvent::Other(RawEvent::Key {
        code: key.code,
        modifiers: key.modifiers,
        kind: key.kind,
    })
}

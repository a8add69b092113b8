//! Display adapters: where finished frames go and where input comes from.

mod input;
mod raw_mode;
mod terminal;

pub use input::map_event;
pub use raw_mode::TerminalGuard;
pub use terminal::{TerminalDisplay, Viewport};

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, MouseEvent};

use crate::frame::FrameBuffer;

/// Makes frames visible and owns the input event queue.
pub trait Display {
    /// Show one finished frame.
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError>;

    /// Update the window caption.
    fn set_caption(&mut self, caption: &str) -> Result<(), DisplayError>;

    /// Drain and return every queued event without blocking.
    fn poll_events(&mut self) -> Result<Vec<InputEvent>, DisplayError>;
}

/// Input as seen by the render loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    NavigatePrevious,
    NavigateNext,
    Quit,
    /// Anything else, forwarded to the active effect.
    Other(RawEvent),
}

/// Input the loop doesn't interpret itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    Char(char),
    Left,
    Right,
    Enter,
    Tab,
    Backspace,
    Function(u8),
    /// A key without a variant of its own: chords, releases, and
    /// codes such as PageUp or Home.
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
        kind: KeyEventKind,
    },
    Mouse(MouseEvent),
    Focus { gained: bool },
    Resize { columns: u16, rows: u16 },
    /// Terminal input with no structured form here, such as a paste.
    Unrecognized,
}

/// Display mode switches.
///
/// `hardware_surface` and `double_buffer` are requests; a display that
/// cannot honour them logs and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    pub fullscreen: bool,
    pub hardware_surface: bool,
    pub double_buffer: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

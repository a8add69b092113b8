//! Terminal display using 24-bit colour half blocks.
//!
//! Every character cell shows two vertically stacked pixels: the upper one
//! as the foreground of `▀`, the lower one as the background. Frames are
//! nearest-neighbour scaled into a [`Viewport`].

use crossterm::event::{self, Event};
use crossterm::terminal::{self, BeginSynchronizedUpdate, EndSynchronizedUpdate, SetTitle};
use crossterm::{execute, queue};
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

use super::input::map_event;
use super::raw_mode::TerminalGuard;
use super::{Display, DisplayError, DisplayOptions, InputEvent};
use crate::frame::{channels, FrameBuffer, FrameFormat, Pixel};

const UPPER_HALF_BLOCK: char = '▀';

/// Cell rectangle a frame is drawn into (0-based terminal coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u16,
    pub y: u16,
    pub columns: u16,
    pub rows: u16,
}

impl Viewport {
    /// Place a `frame_width` x `frame_height` frame on a terminal.
    ///
    /// Fullscreen stretches over every cell. Otherwise the top row is kept
    /// for the caption and the frame is centred below it with its aspect
    /// ratio preserved. Returns `None` if there is no room at all.
    pub fn fit(
        frame_width: u32,
        frame_height: u32,
        term_columns: u16,
        term_rows: u16,
        fullscreen: bool,
    ) -> Option<Viewport> {
        if frame_width == 0 || frame_height == 0 || term_columns == 0 {
            return None;
        }
        if fullscreen {
            return (term_rows > 0).then_some(Viewport {
                x: 0,
                y: 0,
                columns: term_columns,
                rows: term_rows,
            });
        }

        let avail_rows = term_rows.checked_sub(1).filter(|&r| r > 0)?;
        let avail_w = term_columns as u64;
        let avail_h = avail_rows as u64 * 2;
        let (fw, fh) = (frame_width as u64, frame_height as u64);

        let (columns, rows) = if fw * avail_h <= fh * avail_w {
            // Height-limited
            ((fw * avail_h / fh).max(1), avail_rows as u64)
        } else {
            // Width-limited
            (avail_w, (fh * avail_w / fw / 2).max(1))
        };
        let columns = columns.min(avail_w) as u16;
        let rows = rows.min(avail_rows as u64) as u16;

        Some(Viewport {
            x: (term_columns - columns) / 2,
            y: 1 + (avail_rows - rows) / 2,
            columns,
            rows,
        })
    }
}

/// Append the escape sequences drawing `frame` into `viewport` to `out`.
///
/// When `caption` is given it is written on the first terminal row,
/// truncated to `term_columns`.
pub fn compose(
    frame: &FrameBuffer,
    viewport: Viewport,
    caption: Option<&str>,
    term_columns: u16,
    out: &mut String,
) {
    if let Some(caption) = caption {
        out.push_str("\x1b[0m\x1b[1;1H\x1b[2K");
        out.extend(caption.chars().take(term_columns as usize));
    }

    let fw = frame.width() as u64;
    let fh = frame.height() as u64;
    let cols = viewport.columns as u64;
    let pixel_rows = viewport.rows as u64 * 2;
    let mut last: Option<(Pixel, Pixel)> = None;

    for row in 0..viewport.rows as u64 {
        let _ = write!(
            out,
            "\x1b[{};{}H",
            viewport.y as u64 + row + 1,
            viewport.x as u64 + 1
        );
        let top = frame.row(((2 * row) * fh / pixel_rows) as u32);
        let bottom = frame.row(((2 * row + 1) * fh / pixel_rows) as u32);
        for col in 0..cols {
            let sx = (col * fw / cols) as usize;
            let pair = (top[sx], bottom[sx]);
            if last != Some(pair) {
                let (tr, tg, tb) = channels(pair.0);
                let (br, bg, bb) = channels(pair.1);
                let _ = write!(
                    out,
                    "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
                    tr, tg, tb, br, bg, bb
                );
                last = Some(pair);
            }
            out.push(UPPER_HALF_BLOCK);
        }
    }
    out.push_str("\x1b[0m");
}

/// Full-terminal display with the caption mirrored to the terminal title.
///
/// The terminal is restored when the display is dropped.
pub struct TerminalDisplay {
    format: FrameFormat,
    options: DisplayOptions,
    columns: u16,
    rows: u16,
    caption: String,
    needs_clear: bool,
    scratch: String,
    out: io::Stdout,
    _guard: TerminalGuard,
}

impl std::fmt::Debug for TerminalDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDisplay")
            .field("format", &self.format)
            .field("options", &self.options)
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

impl TerminalDisplay {
    /// Take over the terminal for frames of `format`.
    ///
    /// # Errors
    /// * `DisplayError::Io` - If the terminal can't be switched to raw mode
    pub fn open(format: FrameFormat, options: DisplayOptions) -> Result<Self, DisplayError> {
        let guard = TerminalGuard::enter()?;
        let (columns, rows) = terminal::size()?;

        if options.hardware_surface {
            log::info!("hardware surfaces are not available on a terminal, ignoring");
        }
        log::debug!(
            "terminal display {}x{} cells for {} frames ({:?})",
            columns,
            rows,
            format,
            options
        );

        Ok(Self {
            format,
            options,
            columns,
            rows,
            caption: String::new(),
            needs_clear: true,
            scratch: String::new(),
            out: io::stdout(),
            _guard: guard,
        })
    }

    fn write_frame(&mut self) -> io::Result<()> {
        if self.options.double_buffer {
            queue!(self.out, BeginSynchronizedUpdate)?;
            self.out.write_all(self.scratch.as_bytes())?;
            queue!(self.out, EndSynchronizedUpdate)?;
        } else {
            self.out.write_all(self.scratch.as_bytes())?;
        }
        self.out.flush()
    }
}

impl Display for TerminalDisplay {
    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let Some(viewport) = Viewport::fit(
            frame.width(),
            frame.height(),
            self.columns,
            self.rows,
            self.options.fullscreen,
        ) else {
            return Ok(());
        };

        self.scratch.clear();
        if self.needs_clear {
            self.scratch.push_str("\x1b[0m\x1b[2J");
            self.needs_clear = false;
        }
        let caption = (!self.options.fullscreen).then_some(self.caption.as_str());
        compose(frame, viewport, caption, self.columns, &mut self.scratch);
        self.write_frame()?;
        Ok(())
    }

    fn set_caption(&mut self, caption: &str) -> Result<(), DisplayError> {
        if self.caption != caption {
            self.caption = caption.to_string();
            execute!(self.out, SetTitle(caption))?;
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>, DisplayError> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let event = event::read()?;
            if let Event::Resize(columns, rows) = event {
                self.columns = columns;
                self.rows = rows;
                self.needs_clear = true;
            }
            if let Some(mapped) = map_event(&event) {
                events.push(mapped);
            }
        }
        Ok(events)
    }
}

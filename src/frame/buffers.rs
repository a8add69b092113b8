//! Frame buffer manager.
//!
//! Four buffers of identical format, each owned by exactly one role at a
//! time:
//!
//! | role   | owner                          |
//! |--------|--------------------------------|
//! | live   | capture adapter, being filled  |
//! | stable | last complete capture, read by the effect |
//! | back   | output the effect writes this tick |
//! | front  | output last handed to the display |
//!
//! Roles change only by swapping at two hand-off points: after a capture
//! completes (`live` <-> `stable`) and when a finished output is presented
//! (`back` <-> `front`). A capture that fails part-way leaves `stable`
//! untouched, and the display only ever sees `front`, which is never a
//! capture target.

use std::mem;

use super::types::{FrameBuffer, FrameError, FrameFormat, Pixel};
use crate::capture::{CaptureError, CaptureSource};
use crate::display::{Display, DisplayError};

/// Owns the pipeline's frame buffers and arbitrates their roles.
#[derive(Debug)]
pub struct FrameBuffers {
    format: FrameFormat,
    live: FrameBuffer,
    stable: FrameBuffer,
    back: FrameBuffer,
    front: FrameBuffer,
    captured: u64,
    presented: u64,
}

impl FrameBuffers {
    /// Allocate all buffers for `format`.
    ///
    /// # Errors
    /// * `FrameError::Allocation` - If any buffer cannot be allocated
    pub fn new(format: FrameFormat) -> Result<Self, FrameError> {
        Ok(Self {
            format,
            live: FrameBuffer::allocate(format)?,
            stable: FrameBuffer::allocate(format)?,
            back: FrameBuffer::allocate(format)?,
            front: FrameBuffer::allocate(format)?,
            captured: 0,
            presented: 0,
        })
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Number of completed captures so far.
    pub fn captured(&self) -> u64 {
        self.captured
    }

    /// Number of presented frames so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Fill the live buffer from `source` and promote it to stable.
    ///
    /// Blocks for as long as the source does. On failure the stable buffer
    /// still holds the previous complete frame.
    pub fn capture(&mut self, source: &mut dyn CaptureSource) -> Result<&FrameBuffer, CaptureError> {
        source.grab(&mut self.live)?;
        mem::swap(&mut self.live, &mut self.stable);
        self.captured += 1;
        Ok(&self.stable)
    }

    /// Read-only view of the last complete capture.
    pub fn stable(&self) -> &FrameBuffer {
        &self.stable
    }

    /// Stable input and writable output, borrowed together for one draw.
    /// Output contents are unspecified on entry.
    pub fn frames(&mut self) -> (&FrameBuffer, &mut FrameBuffer) {
        (&self.stable, &mut self.back)
    }

    /// Paint the whole output a single colour.
    pub fn fill_output(&mut self, pixel: Pixel) {
        self.back.fill(pixel);
    }

    /// Hand the finished output to `display`.
    ///
    /// The output becomes the front buffer and the previous front buffer is
    /// recycled as the next output, so the display never receives a buffer
    /// that is still being written.
    pub fn present(&mut self, display: &mut dyn Display) -> Result<(), DisplayError> {
        mem::swap(&mut self.back, &mut self.front);
        display.present(&self.front)?;
        self.presented += 1;
        Ok(())
    }
}

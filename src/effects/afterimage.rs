//! Afterimage: averages the last few frames so motion leaves trails.
//!
//! Each frame is stored at quarter intensity; the output is the sum of the
//! stored frames. Masking with `0xfcfcfc` before the shift keeps every
//! channel at or below 63, so four of them never carry into the next
//! channel.

use super::{Effect, EffectError};
use crate::frame::{FrameBuffer, FrameFormat, Pixel};

const HISTORY: usize = 4;
const QUARTER_MASK: Pixel = 0x00fc_fcfc;

#[derive(Debug, Default)]
pub struct Afterimage {
    history: Vec<FrameBuffer>,
    next: usize,
}

pub fn probe(_format: FrameFormat) -> Option<Box<dyn Effect>> {
    Some(Box::new(Afterimage::default()))
}

impl Effect for Afterimage {
    fn name(&self) -> &str {
        "Afterimage"
    }

    fn start(&mut self, format: FrameFormat) -> Result<(), EffectError> {
        self.history = (0..HISTORY)
            .map(|_| FrameBuffer::allocate(format))
            .collect::<Result<_, _>>()?;
        self.next = 0;
        Ok(())
    }

    fn stop(&mut self) {
        self.history = Vec::new();
    }

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        if self.history.len() != HISTORY {
            return Err(EffectError::NotStarted("Afterimage"));
        }

        let slot = &mut self.history[self.next];
        for (stored, &pixel) in slot.pixels_mut().iter_mut().zip(input.pixels()) {
            *stored = (pixel & QUARTER_MASK) >> 2;
        }
        self.next = (self.next + 1) % HISTORY;

        let [a, b, c, d] = [0, 1, 2, 3].map(|i| self.history[i].pixels());
        for (i, out) in output.pixels_mut().iter_mut().enumerate() {
            *out = a[i] + b[i] + c[i] + d[i];
        }
        Ok(())
    }
}

//! Mirror: reflects one half of the frame onto the other, with an
//! optional XOR colour tint.
//!
//! Space cycles the mirror mode, `0`-`7` pick a tint.

use super::{Effect, EffectError};
use crate::display::RawEvent;
use crate::frame::{FrameBuffer, FrameFormat, Pixel};

const TINTS: [Pixel; 8] = [
    0x000000, 0x000080, 0x008000, 0x008080, 0x800000, 0x800080, 0x808000, 0x808080,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorMode {
    /// Plain copy.
    None,
    /// Left half reflected onto the right.
    #[default]
    Left,
    Right,
    /// Top half reflected onto the bottom.
    Top,
    Bottom,
    /// Top-left quarter reflected into all four quarters.
    Quad,
}

impl MirrorMode {
    pub fn next(self) -> Self {
        match self {
            MirrorMode::None => MirrorMode::Left,
            MirrorMode::Left => MirrorMode::Right,
            MirrorMode::Right => MirrorMode::Top,
            MirrorMode::Top => MirrorMode::Bottom,
            MirrorMode::Bottom => MirrorMode::Quad,
            MirrorMode::Quad => MirrorMode::None,
        }
    }

    fn source_x(self, x: u32, width: u32) -> u32 {
        let opposite = width - 1 - x;
        match self {
            MirrorMode::Left | MirrorMode::Quad => x.min(opposite),
            MirrorMode::Right => x.max(opposite),
            _ => x,
        }
    }

    fn source_y(self, y: u32, height: u32) -> u32 {
        let opposite = height - 1 - y;
        match self {
            MirrorMode::Top | MirrorMode::Quad => y.min(opposite),
            MirrorMode::Bottom => y.max(opposite),
            _ => y,
        }
    }
}

#[derive(Debug, Default)]
pub struct Mirror {
    mode: MirrorMode,
    tint: Pixel,
}

pub fn probe(_format: FrameFormat) -> Option<Box<dyn Effect>> {
    Some(Box::new(Mirror::default()))
}

impl Mirror {
    pub fn with_mode(mode: MirrorMode) -> Self {
        Self { mode, tint: 0 }
    }

    pub fn mode(&self) -> MirrorMode {
        self.mode
    }

    pub fn tint(&self) -> Pixel {
        self.tint
    }
}

impl Effect for Mirror {
    fn name(&self) -> &str {
        "Mirror"
    }

    fn start(&mut self, _format: FrameFormat) -> Result<(), EffectError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        let width = input.width();
        let height = input.height();
        let mode = self.mode;
        let tint = self.tint;

        for y in 0..height {
            let src = input.row(mode.source_y(y, height));
            let dst = output.row_mut(y);
            for (x, out) in dst.iter_mut().enumerate() {
                *out = src[mode.source_x(x as u32, width) as usize] ^ tint;
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &RawEvent) {
        match *event {
            RawEvent::Char(' ') => {
                self.mode = self.mode.next();
                log::debug!("mirror mode {:?}", self.mode);
            }
            RawEvent::Char(c @ '0'..='7') => {
                self.tint = TINTS[c as usize - '0' as usize];
            }
            _ => {}
        }
    }
}

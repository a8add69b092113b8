//! Edge: Sobel gradient magnitude rendered as grey levels.

use super::{Effect, EffectError};
use crate::frame::{luminance, rgb, FrameBuffer, FrameFormat};

#[derive(Debug, Default)]
pub struct Edge {
    /// Luminance of the current input, allocated on start
    luma: Vec<u8>,
}

/// The 3x3 kernel needs at least one interior pixel.
pub fn probe(format: FrameFormat) -> Option<Box<dyn Effect>> {
    if format.width() < 3 || format.height() < 3 {
        return None;
    }
    Some(Box::new(Edge::default()))
}

impl Effect for Edge {
    fn name(&self) -> &str {
        "Edge"
    }

    fn start(&mut self, format: FrameFormat) -> Result<(), EffectError> {
        if format.width() < 3 || format.height() < 3 {
            return Err(EffectError::Unsupported {
                effect: "Edge",
                format,
            });
        }
        self.luma = vec![0; format.area()];
        Ok(())
    }

    fn stop(&mut self) {
        self.luma = Vec::new();
    }

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        if self.luma.len() != input.pixels().len() {
            return Err(EffectError::NotStarted("Edge"));
        }
        for (l, &p) in self.luma.iter_mut().zip(input.pixels()) {
            *l = luminance(p);
        }

        let w = input.width() as usize;
        let h = input.height() as usize;
        let luma = &self.luma;
        let at = |x: usize, y: usize| luma[y * w + x] as i32;

        output.fill(0);
        for y in 1..h - 1 {
            let row = output.row_mut(y as u32);
            for x in 1..w - 1 {
                let gx = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
                let magnitude = ((gx.abs() + gy.abs()) / 2).min(255) as u8;
                row[x] = rgb(magnitude, magnitude, magnitude);
            }
        }
        Ok(())
    }
}

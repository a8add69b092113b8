//! Mosaic: pixelates the frame into square cells of their average colour.
//!
//! `+` / `-` change the cell size.

use super::{Effect, EffectError};
use crate::display::RawEvent;
use crate::frame::{channels, rgb, FrameBuffer, FrameFormat};

const DEFAULT_CELL: u32 = 8;
const MIN_CELL: u32 = 2;
const MAX_CELL: u32 = 32;
const CELL_STEP: u32 = 2;

#[derive(Debug)]
pub struct Mosaic {
    cell: u32,
}

/// Declines frames smaller than one default cell.
pub fn probe(format: FrameFormat) -> Option<Box<dyn Effect>> {
    if format.width() < DEFAULT_CELL || format.height() < DEFAULT_CELL {
        return None;
    }
    Some(Box::new(Mosaic::default()))
}

impl Default for Mosaic {
    fn default() -> Self {
        Self { cell: DEFAULT_CELL }
    }
}

impl Mosaic {
    pub fn with_cell(cell: u32) -> Self {
        Self {
            cell: cell.clamp(MIN_CELL, MAX_CELL),
        }
    }

    pub fn cell(&self) -> u32 {
        self.cell
    }
}

impl Effect for Mosaic {
    fn name(&self) -> &str {
        "Mosaic"
    }

    fn start(&mut self, _format: FrameFormat) -> Result<(), EffectError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        let width = input.width();
        let height = input.height();
        let cell = self.cell;

        for by in (0..height).step_by(cell as usize) {
            let y_end = (by + cell).min(height);
            for bx in (0..width).step_by(cell as usize) {
                let x_end = (bx + cell).min(width);
                let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
                for y in by..y_end {
                    for &pixel in &input.row(y)[bx as usize..x_end as usize] {
                        let (pr, pg, pb) = channels(pixel);
                        r += pr as u32;
                        g += pg as u32;
                        b += pb as u32;
                    }
                }
                let count = (y_end - by) * (x_end - bx);
                let average = rgb((r / count) as u8, (g / count) as u8, (b / count) as u8);
                for y in by..y_end {
                    output.row_mut(y)[bx as usize..x_end as usize].fill(average);
                }
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &RawEvent) {
        match event {
            RawEvent::Char('+') | RawEvent::Char('=') => {
                self.cell = (self.cell + CELL_STEP).min(MAX_CELL);
            }
            RawEvent::Char('-') => {
                self.cell = self.cell.saturating_sub(CELL_STEP).max(MIN_CELL);
            }
            _ => {}
        }
    }
}

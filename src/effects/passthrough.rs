//! Passthrough: shows the captured frame unchanged.

use super::{Effect, EffectError};
use crate::frame::{FrameBuffer, FrameFormat};

#[derive(Debug, Default)]
pub struct Passthrough;

pub fn probe(_format: FrameFormat) -> Option<Box<dyn Effect>> {
    Some(Box::new(Passthrough))
}

impl Effect for Passthrough {
    fn name(&self) -> &str {
        "Passthrough"
    }

    fn start(&mut self, _format: FrameFormat) -> Result<(), EffectError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError> {
        output.copy_from(input)?;
        Ok(())
    }
}

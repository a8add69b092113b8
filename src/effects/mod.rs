//! Effects: swappable per-frame pixel transforms.
//!
//! Every effect implements [`Effect`]. The set available at runtime is
//! built once at startup by [`EffectRegistry::register_all`] from an ordered
//! list of [`Candidate`]s; a candidate may decline when it can't work with
//! the negotiated [`FrameFormat`].

mod afterimage;
mod edge;
mod mirror;
mod mosaic;
mod passthrough;
mod registry;

pub use afterimage::Afterimage;
pub use edge::Edge;
pub use mirror::{Mirror, MirrorMode};
pub use mosaic::Mosaic;
pub use passthrough::Passthrough;
pub use registry::{Candidate, EffectRegistry, MAX_NAME_LEN};

use crate::display::RawEvent;
use crate::frame::{FrameBuffer, FrameError, FrameFormat};

/// Lifecycle contract every effect satisfies.
///
/// The pipeline guarantees the call order
/// `start -> draw* -> stop`, repeated any number of times, and never calls
/// `draw` or `stop` on an effect whose `start` failed.
pub trait Effect {
    /// Display name, shown in the caption.
    fn name(&self) -> &str;

    /// Acquire per-run state for frames of `format`.
    fn start(&mut self, format: FrameFormat) -> Result<(), EffectError>;

    /// Release per-run state.
    fn stop(&mut self);

    /// Transform one frame. `output` contents are unspecified on entry, so
    /// every pixel must be written.
    fn draw(&mut self, input: &FrameBuffer, output: &mut FrameBuffer) -> Result<(), EffectError>;

    /// Input the render loop didn't consume. Ignored by default.
    fn handle_event(&mut self, _event: &RawEvent) {}
}

#[derive(Debug, thiserror::Error)]
pub enum EffectError {
    #[error("{effect} cannot run at {format}")]
    Unsupported {
        effect: &'static str,
        format: FrameFormat,
    },
    #[error("{0} was used before start")]
    NotStarted(&'static str),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Built-in effects, in registration order.
pub fn builtin_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("passthrough", passthrough::probe),
        Candidate::new("mosaic", mosaic::probe),
        Candidate::new("edge", edge::probe),
        Candidate::new("afterimage", afterimage::probe),
        Candidate::new("mirror", mirror::probe),
    ]
}

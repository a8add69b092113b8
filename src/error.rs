//! Fatal errors that end the viewer.
//!
//! Everything in here is reported to the operator by `main` and the process
//! exits with status 1. Effect failures at runtime never reach this type;
//! the pipeline absorbs them into its error fallback.

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::display::DisplayError;
use crate::frame::FrameError;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Memory allocation failed: {0}")]
    Buffers(#[source] FrameError),
    #[error("Video initialization failed: {0}")]
    Capture(#[source] CaptureError),
    #[error("Screen initialization failed: {0}")]
    DisplayInit(#[source] DisplayError),
    #[error("Display failed: {0}")]
    Display(#[source] DisplayError),
    #[error("No available effect.")]
    NoEffects,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

//! Frame buffers shared by capture, effects and display.
//!
//! - Pixel layout and dimensions via [`FrameFormat`] and [`FrameBuffer`]
//! - Buffer ownership and double buffering via [`FrameBuffers`]

mod buffers;
mod types;

pub use buffers::FrameBuffers;
pub use types::{
    channels, luminance, mirror_horizontal, rgb, FrameBuffer, FrameError, FrameFormat, Pixel,
    Resolution, Scale, ERROR_COLOR,
};

//! Capture adapters: where raw frames come from.
//!
//! The core only sees [`CaptureSource`], a blocking "fill this buffer with
//! the next complete frame" operation. Backends:
//! - [`TestPattern`]: synthetic signal, always available
//! - `CameraSource`: live webcam via nokhwa (feature `camera`)

#[cfg(feature = "camera")]
mod camera;
#[cfg(feature = "camera")]
mod camera_loop;
mod convert;
mod pattern;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::frame::{FrameBuffer, FrameFormat};

#[cfg(feature = "camera")]
pub use camera::{list_devices, CameraSource};
pub use convert::blit_rgb;
pub use pattern::{PatternKind, TestPattern};

/// Produces one complete frame per call.
pub trait CaptureSource {
    /// Short description for logs, e.g. `camera 0 @ 30 fps`.
    fn describe(&self) -> String;

    /// Fill `target` with the next complete frame.
    ///
    /// May block briefly until a new frame is ready. `target` always has the
    /// pipeline's format; on error its contents are unspecified.
    fn grab(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError>;
}

/// Broadcast signal norm. Determines the nominal frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoNorm {
    #[default]
    Ntsc,
    Pal,
    Secam,
    NtscJp,
}

impl VideoNorm {
    pub const ALL: [VideoNorm; 4] = [
        VideoNorm::Ntsc,
        VideoNorm::Pal,
        VideoNorm::Secam,
        VideoNorm::NtscJp,
    ];

    /// Parse a norm name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ntsc" => Some(Self::Ntsc),
            "pal" => Some(Self::Pal),
            "secam" => Some(Self::Secam),
            "ntsc-jp" | "ntsc_jp" | "ntscjp" => Some(Self::NtscJp),
            _ => None,
        }
    }

    /// Nominal frames per second.
    pub fn frame_rate(self) -> u32 {
        match self {
            Self::Ntsc | Self::NtscJp => 30,
            Self::Pal | Self::Secam => 25,
        }
    }

    pub fn frame_interval(self) -> Duration {
        Duration::from_secs(1) / self.frame_rate()
    }
}

impl fmt::Display for VideoNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ntsc => write!(f, "ntsc"),
            Self::Pal => write!(f, "pal"),
            Self::Secam => write!(f, "secam"),
            Self::NtscJp => write!(f, "ntsc-jp"),
        }
    }
}

/// Which capture device to open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSpec {
    /// Camera 0 when built with camera support, otherwise the test pattern.
    #[default]
    SystemDefault,
    /// Synthetic test pattern.
    Pattern,
    /// Camera by index (`2` or `/dev/video2`).
    Camera(u32),
}

impl DeviceSpec {
    /// Resolve [`DeviceSpec::SystemDefault`] for this build.
    pub fn resolve(&self) -> DeviceSpec {
        match self {
            DeviceSpec::SystemDefault if cfg!(feature = "camera") => DeviceSpec::Camera(0),
            DeviceSpec::SystemDefault => DeviceSpec::Pattern,
            other => other.clone(),
        }
    }
}

impl FromStr for DeviceSpec {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "" | "default" => return Ok(DeviceSpec::SystemDefault),
            "pattern" | "test" => return Ok(DeviceSpec::Pattern),
            _ => {}
        }
        let index = s.strip_prefix("/dev/video").unwrap_or(s);
        index
            .parse()
            .map(DeviceSpec::Camera)
            .map_err(|_| CaptureError::InvalidDevice(s.to_string()))
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSpec::SystemDefault => write!(f, "default"),
            DeviceSpec::Pattern => write!(f, "pattern"),
            DeviceSpec::Camera(index) => write!(f, "camera {}", index),
        }
    }
}

/// Settings for opening a capture source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureConfig {
    pub device: DeviceSpec,
    /// Input channel on the device (signal selector for the test pattern).
    pub channel: u32,
    pub norm: VideoNorm,
    /// Flip every frame left-right.
    pub mirror: bool,
}

/// Errors that can occur while opening or reading a capture source.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("invalid capture device '{0}'")]
    InvalidDevice(String),
    #[error("capture device {0} not found")]
    DeviceNotFound(u32),
    #[error("channel {channel} not available on {device}")]
    ChannelNotFound { device: String, channel: u32 },
    #[error("camera support is not compiled in (rebuild with --features camera)")]
    BackendUnavailable,
    #[error("failed to query capture devices: {0}")]
    QueryFailed(String),
    #[error("failed to open capture device: {0}")]
    OpenFailed(String),
    #[error("capture stream failed: {0}")]
    StreamFailed(String),
    #[error("timed out waiting for a frame")]
    Timeout,
}

/// Open the capture source described by `config`, producing frames in `format`.
///
/// # Errors
/// * `CaptureError::BackendUnavailable` - A camera was requested without camera support
/// * `CaptureError::ChannelNotFound` - The device has no such channel
/// * `CaptureError::DeviceNotFound` / `OpenFailed` / `StreamFailed` - Camera failures
pub fn open(
    config: &CaptureConfig,
    format: FrameFormat,
) -> Result<Box<dyn CaptureSource>, CaptureError> {
    let source: Box<dyn CaptureSource> = match config.device.resolve() {
        DeviceSpec::Camera(index) => open_camera(index, config, format)?,
        _ => Box::new(TestPattern::open(config)?),
    };
    log::info!(
        "capturing from {} ({} norm, {} buffers)",
        source.describe(),
        config.norm,
        format
    );
    Ok(source)
}

#[cfg(feature = "camera")]
fn open_camera(
    index: u32,
    config: &CaptureConfig,
    format: FrameFormat,
) -> Result<Box<dyn CaptureSource>, CaptureError> {
    let mut camera = CameraSource::open(index, config)?;
    camera.start(format)?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "camera"))]
fn open_camera(
    _index: u32,
    _config: &CaptureConfig,
    _format: FrameFormat,
) -> Result<Box<dyn CaptureSource>, CaptureError> {
    Err(CaptureError::BackendUnavailable)
}

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    pub index: u32,
    pub name: String,
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// List camera devices. Always fails without camera support.
#[cfg(not(feature = "camera"))]
pub fn list_devices() -> Result<Vec<CameraInfo>, CaptureError> {
    Err(CaptureError::BackendUnavailable)
}

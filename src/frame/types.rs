//! Pixel, format and buffer types.

use std::fmt;
use std::str::FromStr;

/// One pixel in the canonical `0x00RRGGBB` layout.
pub type Pixel = u32;

/// Solid colour presented while the pipeline is in error fallback.
pub const ERROR_COLOR: Pixel = 0x00ff_0000;

/// Pack 8-bit channels into a [`Pixel`].
#[inline]
pub fn rgb(r: u8, g: u8, b: u8) -> Pixel {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split a [`Pixel`] into its `(r, g, b)` channels.
#[inline]
pub fn channels(pixel: Pixel) -> (u8, u8, u8) {
    ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

/// ITU-R BT.601 luminance with integer math.
///
/// Coefficients are scaled by 1000: 299 + 587 + 114 = 1000.
#[inline]
pub fn luminance(pixel: Pixel) -> u8 {
    let (r, g, b) = channels(pixel);
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Base capture/display resolution, before scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 320x240, the classic capture size and the default.
    pub const LOW: Resolution = Resolution {
        width: 320,
        height: 240,
    };

    /// 640x480
    pub const MEDIUM: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// Largest resolution accepted from the command line or config.
    pub const MAX: Resolution = Resolution {
        width: 1920,
        height: 1080,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::LOW
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `320x240`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((w, h)) = s.split_once('x') else {
            return Err(format!(
                "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 320x240)",
                s
            ));
        };
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid width '{}' in resolution", w))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid height '{}' in resolution", h))?;
        if width == 0 || height == 0 {
            return Err("Resolution width and height must be greater than 0".to_string());
        }
        if width > Self::MAX.width || height > Self::MAX.height {
            return Err(format!(
                "Resolution exceeds maximum supported ({})",
                Self::MAX
            ));
        }
        Ok(Resolution { width, height })
    }
}

/// Integer scale applied to the base resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scale {
    #[default]
    Single,
    Double,
}

impl Scale {
    pub fn factor(self) -> u32 {
        match self {
            Scale::Single => 1,
            Scale::Double => 2,
        }
    }
}

/// Dimensions and pixel layout shared by every buffer in the pipeline.
///
/// Fixed once at startup and never renegotiated. Pixels are always
/// [`Pixel`] (`0x00RRGGBB`) and rows are tightly packed, so the stride in
/// pixels equals the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFormat {
    pub resolution: Resolution,
    pub scale: Scale,
}

impl FrameFormat {
    pub fn new(resolution: Resolution, scale: Scale) -> Self {
        Self { resolution, scale }
    }

    /// Buffer width in pixels (base width times scale).
    pub fn width(&self) -> u32 {
        self.resolution.width * self.scale.factor()
    }

    /// Buffer height in pixels (base height times scale).
    pub fn height(&self) -> u32 {
        self.resolution.height * self.scale.factor()
    }

    /// Pixels per row.
    pub fn stride(&self) -> usize {
        self.width() as usize
    }

    /// Total pixels per buffer.
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width(), self.height())?;
        if self.scale != Scale::Single {
            write!(f, " ({} x{})", self.resolution, self.scale.factor())?;
        }
        Ok(())
    }
}

/// Errors raised while allocating or copying frame buffers.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("cannot allocate {bytes} bytes for a {format} frame buffer")]
    Allocation { format: FrameFormat, bytes: usize },
    #[error("frame format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        expected: FrameFormat,
        found: FrameFormat,
    },
}

/// A fixed-size grid of pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    format: FrameFormat,
    pixels: Vec<Pixel>,
}

impl FrameBuffer {
    /// Allocate a zeroed (black) buffer for `format`.
    ///
    /// # Errors
    /// * `FrameError::Allocation` - If the allocator cannot satisfy the request
    pub fn allocate(format: FrameFormat) -> Result<Self, FrameError> {
        let area = format.area();
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(area)
            .map_err(|_| FrameError::Allocation {
                format,
                bytes: area.saturating_mul(std::mem::size_of::<Pixel>()),
            })?;
        pixels.resize(area, 0);
        Ok(Self { format, pixels })
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.format.width()
    }

    pub fn height(&self) -> u32 {
        self.format.height()
    }

    pub fn stride(&self) -> usize {
        self.format.stride()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Row `y`, panicking if out of range.
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = y as usize * self.stride();
        &self.pixels[start..start + self.stride()]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    pub fn get(&self, x: u32, y: u32) -> Pixel {
        self.pixels[y as usize * self.stride() + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: Pixel) {
        let stride = self.stride();
        self.pixels[y as usize * stride + x as usize] = pixel;
    }

    pub fn fill(&mut self, pixel: Pixel) {
        self.pixels.fill(pixel);
    }

    /// Copy every pixel of `other` into this buffer.
    ///
    /// # Errors
    /// * `FrameError::FormatMismatch` - If the two buffers differ in dimensions
    pub fn copy_from(&mut self, other: &FrameBuffer) -> Result<(), FrameError> {
        if self.format.width() != other.format.width()
            || self.format.height() != other.format.height()
        {
            return Err(FrameError::FormatMismatch {
                expected: self.format,
                found: other.format,
            });
        }
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }
}

/// Mirror a buffer horizontally (flip left-right).
pub fn mirror_horizontal(frame: &mut FrameBuffer) {
    for y in 0..frame.height() {
        frame.row_mut(y).reverse();
    }
}

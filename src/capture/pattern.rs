//! Synthetic test-pattern source.
//!
//! Useful without a camera and as a deterministic signal for effects. The
//! pattern scrolls one step per frame so temporal effects have motion to
//! work with.

use std::thread;
use std::time::{Duration, Instant};

use super::{CaptureConfig, CaptureError, CaptureSource};
use crate::frame::{mirror_horizontal, rgb, FrameBuffer, Pixel};

/// SMPTE-style bar colours, left to right.
const BARS: [Pixel; 8] = [
    0x00c0_c0c0,
    0x00c0_c000,
    0x0000_c0c0,
    0x0000_c000,
    0x00c0_00c0,
    0x00c0_0000,
    0x0000_00c0,
    0x0000_0000,
];

const CHECKER_SIZE: u32 = 16;

/// Signal selected by the channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Channel 0
    ColorBars,
    /// Channel 1
    Gradient,
    /// Channel 2
    Checkerboard,
}

impl PatternKind {
    pub fn from_channel(channel: u32) -> Option<Self> {
        match channel {
            0 => Some(Self::ColorBars),
            1 => Some(Self::Gradient),
            2 => Some(Self::Checkerboard),
            _ => None,
        }
    }
}

/// Generates frames paced to the configured norm.
#[derive(Debug)]
pub struct TestPattern {
    kind: PatternKind,
    mirror: bool,
    /// `None` disables pacing (frames are produced immediately)
    interval: Option<Duration>,
    next_due: Option<Instant>,
    phase: u32,
}

impl TestPattern {
    /// Open the pattern selected by `config.channel`, paced to `config.norm`.
    ///
    /// # Errors
    /// * `CaptureError::ChannelNotFound` - If the channel has no pattern
    pub fn open(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let kind =
            PatternKind::from_channel(config.channel).ok_or(CaptureError::ChannelNotFound {
                device: "pattern".to_string(),
                channel: config.channel,
            })?;
        Ok(Self {
            kind,
            mirror: config.mirror,
            interval: Some(config.norm.frame_interval()),
            next_due: None,
            phase: 0,
        })
    }

    /// An unpaced pattern, producing frames as fast as they are requested.
    pub fn unpaced(kind: PatternKind) -> Self {
        Self {
            kind,
            mirror: false,
            interval: None,
            next_due: None,
            phase: 0,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    fn wait_for_frame(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        let now = Instant::now();
        let due = self.next_due.unwrap_or(now);
        if due > now {
            thread::sleep(due - now);
        }
        // Don't try to catch up after a stall
        self.next_due = Some(due.max(now) + interval);
    }

    fn render(&self, target: &mut FrameBuffer) {
        let width = target.width();
        let height = target.height();
        let phase = self.phase;
        for y in 0..height {
            let row = target.row_mut(y);
            for (x, pixel) in (0..width).zip(row.iter_mut()) {
                *pixel = match self.kind {
                    PatternKind::ColorBars => {
                        let sx = (x + phase) % width;
                        BARS[(sx as usize * BARS.len()) / width as usize]
                    }
                    PatternKind::Gradient => rgb(
                        (x * 255 / width.max(1)) as u8,
                        (y * 255 / height.max(1)) as u8,
                        (phase % 256) as u8,
                    ),
                    PatternKind::Checkerboard => {
                        let cell = ((x + phase) / CHECKER_SIZE + y / CHECKER_SIZE) % 2;
                        if cell == 0 {
                            0x00ff_ffff
                        } else {
                            0
                        }
                    }
                };
            }
        }
    }
}

impl CaptureSource for TestPattern {
    fn describe(&self) -> String {
        match self.interval {
            Some(interval) => format!(
                "test pattern {:?} @ {:.0} fps",
                self.kind,
                1.0 / interval.as_secs_f64()
            ),
            None => format!("test pattern {:?}", self.kind),
        }
    }

    fn grab(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        self.wait_for_frame();
        self.render(target);
        if self.mirror {
            mirror_horizontal(target);
        }
        self.phase = self.phase.wrapping_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{DeviceSpec, VideoNorm};
    use crate::frame::{FrameFormat, Resolution, Scale};

    fn target() -> FrameBuffer {
        FrameBuffer::allocate(FrameFormat::new(
            Resolution {
                width: 64,
                height: 8,
            },
            Scale::Single,
        ))
        .unwrap()
    }

    #[test]
    fn test_channel_selects_pattern() {
        assert_eq!(PatternKind::from_channel(0), Some(PatternKind::ColorBars));
        assert_eq!(PatternKind::from_channel(1), Some(PatternKind::Gradient));
        assert_eq!(PatternKind::from_channel(2), Some(PatternKind::Checkerboard));
        assert_eq!(PatternKind::from_channel(3), None);
    }

    #[test]
    fn test_open_rejects_unknown_channel() {
        let config = CaptureConfig {
            device: DeviceSpec::Pattern,
            channel: 9,
            norm: VideoNorm::Pal,
            mirror: false,
        };
        match TestPattern::open(&config) {
            Err(CaptureError::ChannelNotFound { channel, .. }) => assert_eq!(channel, 9),
            other => panic!("Expected ChannelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_color_bars_layout() {
        let mut pattern = TestPattern::unpaced(PatternKind::ColorBars);
        let mut frame = target();
        pattern.grab(&mut frame).unwrap();
        assert_eq!(frame.get(0, 0), BARS[0]);
        assert_eq!(frame.get(63, 7), BARS[7]);
    }

    #[test]
    fn test_pattern_scrolls_between_frames() {
        let mut pattern = TestPattern::unpaced(PatternKind::Checkerboard);
        let mut first = target();
        let mut second = target();
        pattern.grab(&mut first).unwrap();
        pattern.grab(&mut second).unwrap();
        assert_ne!(first.pixels(), second.pixels());
    }

    #[test]
    fn test_mirror_flips_frame() {
        let mut plain = TestPattern::unpaced(PatternKind::Gradient);
        let mut mirrored = TestPattern::unpaced(PatternKind::Gradient);
        mirrored.mirror = true;
        let mut a = target();
        let mut b = target();
        plain.grab(&mut a).unwrap();
        mirrored.grab(&mut b).unwrap();
        assert_eq!(a.get(0, 3), b.get(63, 3));
    }

    #[test]
    fn test_paced_pattern_waits_between_frames() {
        let config = CaptureConfig {
            device: DeviceSpec::Pattern,
            channel: 0,
            norm: VideoNorm::Pal,
            mirror: false,
        };
        let mut pattern = TestPattern::open(&config).unwrap();
        let mut frame = target();
        let start = Instant::now();
        pattern.grab(&mut frame).unwrap();
        pattern.grab(&mut frame).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(35));
        assert!(pattern.describe().contains("25 fps"));
    }
}

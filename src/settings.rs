//! Effective run settings: command line over config file over defaults.

use crate::capture::{CaptureConfig, DeviceSpec, VideoNorm};
use crate::cli::Args;
use crate::config::{Config, ConfigError};
use crate::display::DisplayOptions;
use crate::frame::{FrameFormat, Resolution, Scale};

/// Everything needed to start a viewer session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub capture: CaptureConfig,
    pub format: FrameFormat,
    pub display: DisplayOptions,
    pub show_frame_rate: bool,
}

impl Settings {
    /// Merge `args` over `config`.
    ///
    /// Flags are additive: a flag set in either place is on.
    ///
    /// # Errors
    /// * `ConfigError::Invalid` - If a config value doesn't parse
    pub fn resolve(args: &Args, config: &Config) -> Result<Self, ConfigError> {
        let device = match (&args.device, &config.capture.device) {
            (Some(device), _) => device.clone(),
            (None, Some(text)) => text.parse::<DeviceSpec>().map_err(|e| ConfigError::Invalid {
                key: "capture.device",
                message: e.to_string(),
            })?,
            (None, None) => DeviceSpec::default(),
        };

        let norm = match (args.norm, &config.capture.norm) {
            (Some(norm), _) => norm.into(),
            (None, Some(name)) => {
                VideoNorm::from_name(name).ok_or_else(|| ConfigError::Invalid {
                    key: "capture.norm",
                    message: format!(
                        "unknown norm '{}' (expected one of: {})",
                        name,
                        VideoNorm::ALL.map(|n| n.to_string()).join(", ")
                    ),
                })?
            }
            (None, None) => VideoNorm::default(),
        };

        let resolution = match (args.resolution, &config.display.resolution) {
            (Some(resolution), _) => resolution,
            (None, Some(text)) => {
                text.parse::<Resolution>()
                    .map_err(|message| ConfigError::Invalid {
                        key: "display.resolution",
                        message,
                    })?
            }
            (None, None) => Resolution::default(),
        };

        let scale = if args.double || config.display.double {
            Scale::Double
        } else {
            Scale::Single
        };

        Ok(Settings {
            capture: CaptureConfig {
                device,
                channel: args.channel.or(config.capture.channel).unwrap_or(0),
                norm,
                mirror: args.mirror || config.capture.mirror,
            },
            format: FrameFormat::new(resolution, scale),
            display: DisplayOptions {
                fullscreen: args.fullscreen || config.display.fullscreen,
                hardware_surface: args.hardware || config.display.hardware,
                double_buffer: args.doublebuffer || config.display.doublebuffer,
            },
            show_frame_rate: args.fps || config.display.fps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once("effect-viewer").chain(argv.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args(&[]), &Config::default()).unwrap();
        assert_eq!(settings.capture, CaptureConfig::default());
        assert_eq!(settings.format, FrameFormat::default());
        assert_eq!(settings.display, DisplayOptions::default());
        assert!(!settings.show_frame_rate);
    }

    #[test]
    fn test_config_fills_gaps() {
        let mut config = Config::default();
        config.capture.device = Some("pattern".into());
        config.capture.channel = Some(2);
        config.capture.norm = Some("secam".into());
        config.display.resolution = Some("640x480".into());
        config.display.fps = true;

        let settings = Settings::resolve(&args(&[]), &config).unwrap();
        assert_eq!(settings.capture.device, DeviceSpec::Pattern);
        assert_eq!(settings.capture.channel, 2);
        assert_eq!(settings.capture.norm, VideoNorm::Secam);
        assert_eq!(settings.format.width(), 640);
        assert!(settings.show_frame_rate);
    }

    #[test]
    fn test_command_line_wins() {
        let mut config = Config::default();
        config.capture.channel = Some(2);
        config.capture.norm = Some("secam".into());
        config.display.resolution = Some("640x480".into());

        let settings = Settings::resolve(
            &args(&[
                "--channel",
                "1",
                "--norm",
                "pal",
                "--resolution",
                "160x120",
                "--double",
                "--device",
                "/dev/video3",
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(settings.capture.channel, 1);
        assert_eq!(settings.capture.norm, VideoNorm::Pal);
        assert_eq!(settings.capture.device, DeviceSpec::Camera(3));
        assert_eq!(settings.format.width(), 320);
        assert_eq!(settings.format.height(), 240);
    }

    #[test]
    fn test_flags_from_either_source() {
        let mut config = Config::default();
        config.display.hardware = true;
        config.capture.mirror = true;
        let settings =
            Settings::resolve(&args(&["--fullscreen", "--doublebuffer"]), &config).unwrap();
        assert!(settings.display.fullscreen);
        assert!(settings.display.hardware_surface);
        assert!(settings.display.double_buffer);
        assert!(settings.capture.mirror);
    }

    #[test]
    fn test_invalid_config_values() {
        let mut config = Config::default();
        config.capture.norm = Some("mpeg".into());
        let err = Settings::resolve(&args(&[]), &config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "capture.norm",
                ..
            }
        ));

        let mut config = Config::default();
        config.display.resolution = Some("big".into());
        assert!(Settings::resolve(&args(&[]), &config).is_err());

        let mut config = Config::default();
        config.capture.device = Some("webcam".into());
        assert!(Settings::resolve(&args(&[]), &config).is_err());
    }
}

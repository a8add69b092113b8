//! Configuration file handling for effect-viewer.
//!
//! Loads configuration from `<config dir>/effect-viewer/config.toml` or a
//! custom path. Every key is optional; command-line options win over the
//! file and the file wins over built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureSection {
    /// `pattern`, a camera index or `/dev/videoN`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm: Option<String>,
    pub mirror: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    /// `WIDTHxHEIGHT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub fullscreen: bool,
    pub double: bool,
    pub hardware: bool,
    pub doublebuffer: bool,
    pub fps: bool,
}

/// Commented template written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# effect-viewer configuration

[capture]
# "pattern" for the built-in test signal, or a camera index / /dev/videoN
device = "pattern"
# Input channel (selects the signal for the test pattern:
# 0 colour bars, 1 gradient, 2 checkerboard)
channel = 0
# Signal norm: ntsc, pal, secam, ntsc-jp
norm = "ntsc"
# Flip horizontally (selfie mode)
mirror = false

[display]
# Base frame size
resolution = "320x240"
fullscreen = false
# Double the frame size
double = false
# Request a hardware surface (best effort)
hardware = false
# Present each frame in one synchronized update
doublebuffer = false
# Show the frame rate in the caption
fps = false
"#;

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist and parse. Without one the default
    /// location is tried: a missing file gives the defaults and an
    /// unreadable one is logged and ignored.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = default_path();
                if !path.exists() {
                    log::debug!("no config file at {}", path.display());
                    return Ok(Config::default());
                }
                match Self::load_from(&path) {
                    Ok(config) => Ok(config),
                    Err(e) => {
                        log::warn!("{}; using defaults", e);
                        Ok(Config::default())
                    }
                }
            }
        }
    }

    /// Read and parse the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Write [`DEFAULT_CONFIG`] to `path`, creating parent directories.
///
/// # Errors
/// * `ConfigError::Exists` - If a file is already there
/// * `ConfigError::Io` - If the directory or file can't be written
pub fn write_default(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Exists(path.to_path_buf()));
    }
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_error)
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to render config: {0}")]
    Serialize(#[source] toml::ser::Error),
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
    #[error("Config file already exists: {}", .0.display())]
    Exists(PathBuf),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("effect-viewer")
        .join("config.toml")
}

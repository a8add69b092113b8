//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Norm;
use crate::capture::DeviceSpec;
use crate::frame::Resolution;

/// Live video through a selectable chain of pixel effects.
///
/// Up / Down switch effects, Esc quits.
#[derive(Parser, Debug)]
#[command(name = "effect-viewer")]
#[command(version, about = "Real-time video effect viewer", long_about = None)]
#[command(infer_long_args = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Capture device: "pattern", a camera index or /dev/videoN
    #[arg(short, long)]
    pub device: Option<DeviceSpec>,

    /// Input channel on the device
    #[arg(long)]
    pub channel: Option<u32>,

    /// Signal norm
    #[arg(short, long, value_enum)]
    pub norm: Option<Norm>,

    /// Use the whole screen
    #[arg(long)]
    pub fullscreen: bool,

    /// Double the frame size
    #[arg(long)]
    pub double: bool,

    /// Request a hardware display surface
    #[arg(long)]
    pub hardware: bool,

    /// Present each frame in a single synchronized update
    #[arg(long)]
    pub doublebuffer: bool,

    /// Show the frame rate in the caption
    #[arg(long)]
    pub fps: bool,

    /// Base frame size, WIDTHxHEIGHT
    #[arg(short, long)]
    pub resolution: Option<Resolution>,

    /// Mirror the picture horizontally
    #[arg(long)]
    pub mirror: bool,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the effects available at the configured frame size
    ListEffects,
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Create default config file
    Init,
}

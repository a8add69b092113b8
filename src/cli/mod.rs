//! Command-line interface definitions and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{handle_config_action, list_cameras, list_effects};
pub use enums::Norm;

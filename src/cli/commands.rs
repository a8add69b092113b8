//! Subcommand handlers for list-effects, list-cameras and config actions.

use std::path::Path;

use super::args::{Args, ConfigAction};
use crate::capture::{self, CaptureError};
use crate::config::{self, Config, ConfigError};
use crate::effects::{builtin_candidates, EffectRegistry};
use crate::error::ViewerError;
use crate::settings::Settings;

/// Probe the built-in effects at the configured frame size and print the
/// ones that are available.
pub fn list_effects(settings: &Settings) -> Result<(), ViewerError> {
    let registry = EffectRegistry::register_all(builtin_candidates(), settings.format);
    if registry.is_empty() {
        return Err(ViewerError::NoEffects);
    }
    println!("Effects available at {}:", settings.format);
    for (index, name) in registry.names().enumerate() {
        println!("  [{}] {}", index, name);
    }
    Ok(())
}

/// List available cameras and print them to stdout.
pub fn list_cameras() -> Result<(), CaptureError> {
    let devices = capture::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
        println!("Use --device pattern to run on the built-in test signal.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --device <index> to select a camera.");
    }
    Ok(())
}

/// Handle config subcommand actions.
///
/// Honours `--config` and, for `show`, every other option in `args`.
pub fn handle_config_action(action: &ConfigAction, args: &Args) -> Result<(), ConfigError> {
    let path = args.config.as_deref();
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config::default_path);
    match action {
        ConfigAction::Show => {
            let config = Config::load(path)?;
            let settings = Settings::resolve(args, &config)?;
            println!("Current configuration:");
            println!("  Device: {}", settings.capture.device);
            println!("  Channel: {}", settings.capture.channel);
            println!(
                "  Norm: {} ({} fps)",
                settings.capture.norm,
                settings.capture.norm.frame_rate()
            );
            println!("  Mirror: {}", yes_no(settings.capture.mirror));
            println!("  Frame size: {}", settings.format);
            println!("  Fullscreen: {}", yes_no(settings.display.fullscreen));
            println!(
                "  Hardware surface: {}",
                yes_no(settings.display.hardware_surface)
            );
            println!("  Double buffer: {}", yes_no(settings.display.double_buffer));
            println!("  Frame rate display: {}", yes_no(settings.show_frame_rate));
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
                let text = config.to_toml()?;
                if !text.trim().is_empty() {
                    println!();
                    print!("{}", text);
                }
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            config::write_default(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

use clap::Parser;
use std::error::Error;

use effect_viewer::capture;
use effect_viewer::cli::{handle_config_action, list_cameras, list_effects, Args, Command};
use effect_viewer::config::Config;
use effect_viewer::display::TerminalDisplay;
use effect_viewer::effects::{builtin_candidates, EffectRegistry};
use effect_viewer::event_loop::{setup_ctrlc_handler, Viewer};
use effect_viewer::frame::FrameBuffers;
use effect_viewer::pipeline::Pipeline;
use effect_viewer::settings::Settings;
use effect_viewer::ViewerError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    // Every resource, the terminal included, is released before exiting.
    if let Err(e) = dispatch(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(args: &Args) -> Result<(), Box<dyn Error>> {
    if let Some(Command::Config { action }) = &args.command {
        handle_config_action(action, args)?;
        return Ok(());
    }

    // CLI args > config file > built-in defaults
    let config = Config::load(args.config.as_deref())?;
    let settings = Settings::resolve(args, &config)?;

    match args.command {
        Some(Command::ListEffects) => list_effects(&settings)?,
        Some(Command::ListCameras) => list_cameras()?,
        _ => run_viewer(&settings)?,
    }
    Ok(())
}

/// Startup order matters: everything that can fail without touching the
/// terminal goes before the display is opened.
fn run_viewer(settings: &Settings) -> Result<(), ViewerError> {
    let shutdown = match setup_ctrlc_handler() {
        Ok(flag) => Some(flag),
        Err(e) => {
            log::warn!("Ctrl+C handler not installed: {}", e);
            None
        }
    };

    let buffers = FrameBuffers::new(settings.format).map_err(ViewerError::Buffers)?;
    log::info!("frame format {}", settings.format);

    let source =
        capture::open(&settings.capture, settings.format).map_err(ViewerError::Capture)?;

    let registry = EffectRegistry::register_all(builtin_candidates(), settings.format);
    let pipeline = Pipeline::new(registry, settings.format)?;

    let display =
        TerminalDisplay::open(settings.format, settings.display).map_err(ViewerError::DisplayInit)?;

    let mut viewer = Viewer::new(pipeline, buffers, source, Box::new(display))
        .with_frame_rate(settings.show_frame_rate);
    if let Some(flag) = shutdown {
        viewer = viewer.with_shutdown_flag(flag);
    }
    viewer.run()
}

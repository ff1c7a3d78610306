//! gesturefx - play through the effect chain and steer it from the keyboard
//!
//! Run with: cargo run -- [config.yaml]
//!
//! The two proximity sensors are simulated: the arrow keys move the virtual
//! hands. Logs go to `gesturefx.log` so they do not garble the terminal UI.

mod app;
mod ui;

use std::fs::File;
use std::path::PathBuf;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use gesture_fx::EngineConfig;

const LOG_FILE: &str = "gesturefx.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => EngineConfig::load(&path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => {
            log::info!("no config file given, using defaults");
            EngineConfig::default()
        }
    };

    app::run(config)
}

fn init_logging() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err("failed to create log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

//! SukshmaCtl - gesture control daemon for the AR microscope rig
//!
//! Usage:
//! - `sukshma-ctl` (stock configuration)
//! - `sukshma-ctl <path>` or `sukshma-ctl --config <path>`
//! - `sukshma-ctl --mock-can` (no CAN adapter; orientation stays at identity)
//! - `sukshma-ctl --dump-config` (print the effective configuration and exit)

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sukshma_ctl::error::{Error, Result};
use sukshma_ctl::ui::LogSurface;
use sukshma_ctl::{App, SukshmaConfig};

#[derive(Parser)]
#[command(name = "sukshma-ctl")]
#[command(about = "Gesture control daemon for a motorized AR microscope rig")]
struct Args {
    /// Configuration file (TOML)
    #[arg(value_name = "CONFIG")]
    config_path: Option<PathBuf>,

    /// Configuration file (TOML); same as the positional argument
    #[arg(short, long, conflicts_with = "config_path")]
    config: Option<PathBuf>,

    /// Use the mock CAN bus instead of the SLCAN adapter
    #[arg(long)]
    mock_can: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.as_ref().or(args.config_path.as_ref()) {
        Some(path) => SukshmaConfig::load(path)?,
        None => SukshmaConfig::default(),
    };

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("SukshmaCtl v{} starting...", env!("CARGO_PKG_VERSION"));
    match args.config.as_ref().or(args.config_path.as_ref()) {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("No config file given, using defaults"),
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut app = App::from_config(&config, LogSurface, args.mock_can)?;
    app.run(&running)?;

    log::info!("SukshmaCtl stopped");
    Ok(())
}

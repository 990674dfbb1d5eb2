use clap::Parser;
use std::time::Duration;

use webcam_studio::camera::NativeMediaDevices;
use webcam_studio::cli::{handle_config_action, list_cameras, resolve_options, Args, Command};
use webcam_studio::config::Config;
use webcam_studio::event_loop::{self, setup_ctrlc_handler};
use webcam_studio::studio::{Studio, StudioOptions};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}

fn load_options(args: &Args) -> StudioOptions {
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    resolve_options(&config, &args.studio)
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();

    match args.command {
        Some(Command::ListCameras) => list_cameras(),
        Some(Command::Config { ref action }) => {
            handle_config_action(action.clone(), args.config.as_deref(), &args.studio)
        }
        Some(Command::Snapshot { warmup_ms }) => {
            if let Err(e) = setup_ctrlc_handler() {
                log::warn!("Failed to install Ctrl+C handler: {}", e);
            }

            let options = load_options(&args);
            let mut studio = Studio::new(NativeMediaDevices, options);
            match event_loop::snapshot(&mut studio, Duration::from_millis(warmup_ms)).await {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            let options = load_options(&args);
            let mut studio = Studio::new(NativeMediaDevices, options);
            studio.refresh_devices();
            if studio.devices().is_empty() {
                log::warn!("No cameras found; streaming will show an empty canvas");
            }

            // Raw mode turns Ctrl+C into a key event, so no signal handler here
            if let Err(e) = event_loop::run(&mut studio).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

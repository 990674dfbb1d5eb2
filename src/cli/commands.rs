//! Subcommand handlers and option resolution.

use std::path::Path;

use super::args::{ConfigAction, StudioArgs};
use crate::camera::{self, MediaConstraints};
use crate::config::{default_path, Config, DEFAULT_CONFIG_TOML};
use crate::exporter::{default_download_dir, Exporter, WatermarkSource};
use crate::studio::StudioOptions;
use crate::view::ViewState;

/// Merge config file values with command-line overrides.
pub fn resolve_options(config: &Config, args: &StudioArgs) -> StudioOptions {
    let (canvas_width, canvas_height) = args
        .canvas
        .unwrap_or((config.canvas.width, config.canvas.height));

    let view = ViewState {
        filter: args.filter.map(Into::into).unwrap_or(config.view.filter),
        zoom_in_scale: args.zoom.unwrap_or(config.view.zoom),
    };

    let watermark = if args.no_watermark {
        None
    } else {
        args.watermark
            .as_deref()
            .or(config.export.watermark.as_deref())
            .and_then(|s| s.parse::<WatermarkSource>().ok())
    };

    let download_dir = args
        .output_dir
        .clone()
        .or_else(|| config.export.output_dir.clone())
        .unwrap_or_else(default_download_dir);

    StudioOptions {
        canvas_width,
        canvas_height,
        fps: args.fps.unwrap_or(config.canvas.fps),
        view,
        preferred_device: args.camera.clone().or_else(|| config.camera.device.clone()),
        constraints: MediaConstraints {
            mirror: args.mirror || config.camera.mirror,
            ..MediaConstraints::default()
        },
        exporter: Exporter::new(download_dir).with_watermark(watermark),
    }
}

/// List available cameras and print them to stdout.
pub fn list_cameras() {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
                println!(
                    "On macOS, grant access in System Settings > Privacy & Security > Camera."
                );
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use --camera <id> to select a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>, args: &StudioArgs) {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            let config = match Config::load(Some(&config_path)) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let options = resolve_options(&config, args);

            println!("Current configuration:");
            println!(
                "  Camera: {}",
                options.preferred_device.as_deref().unwrap_or("first available")
            );
            println!("  Mirror: {}", if options.constraints.mirror { "yes" } else { "no" });
            println!("  Canvas: {}x{}", options.canvas_width, options.canvas_height);
            println!("  Refresh rate: {} fps", options.fps);
            println!("  Filter: {}", options.view.filter);
            println!("  Zoom: {}", options.view.zoom_in_scale);
            println!(
                "  Watermark: {}",
                options
                    .exporter
                    .watermark()
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("  Output dir: {}", options.exporter.download_dir().display());
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                eprintln!("Use 'webcam-studio config show' to view current settings.");
                std::process::exit(1);
            }

            if let Some(parent) = config_path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    eprintln!("Error creating config directory: {}", e);
                    std::process::exit(1);
                }
            }

            if let Err(e) = std::fs::write(&config_path, DEFAULT_CONFIG_TOML) {
                eprintln!("Error writing config file: {}", e);
                std::process::exit(1);
            }

            println!("Created config file: {}", config_path.display());
        }
    }
}

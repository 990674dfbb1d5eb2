//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::FilterArg;

/// Webcam viewer with live filters, zoom and PNG snapshots
#[derive(Parser, Debug)]
#[command(name = "webcam-studio")]
#[command(version, about = "Webcam viewer with live filters, zoom and snapshots", long_about = None)]
#[command(after_help = "KEYS (interactive mode):
    space    start / release stream
    + / -    zoom in / out
    1 2 3    original / grayscale / blur
    d        next camera
    s        save frame
    q        quit")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub studio: StudioArgs,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

/// Options shared by interactive mode and `snapshot`.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct StudioArgs {
    /// Camera device id (from list-cameras)
    #[arg(long, global = true)]
    pub camera: Option<String>,

    /// Initial filter
    #[arg(long, short, global = true)]
    pub filter: Option<FilterArg>,

    /// Initial zoom multiplier
    #[arg(long, short, global = true, value_parser = parse_zoom)]
    pub zoom: Option<f64>,

    /// Watermark image for saved frames (file path or http(s) URL)
    #[arg(long, short, global = true)]
    pub watermark: Option<String>,

    /// Save frames without a watermark, even if one is configured
    #[arg(long, global = true, conflicts_with = "watermark")]
    pub no_watermark: bool,

    /// Directory saved frames are written to
    #[arg(long, short, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long, global = true, value_parser = parse_canvas_size)]
    pub canvas: Option<(u32, u32)>,

    /// Render loop refresh rate (1-240)
    #[arg(long, global = true, value_parser = parse_fps)]
    pub fps: Option<u32>,

    /// Mirror camera horizontally
    #[arg(long, global = true)]
    pub mirror: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Start the stream, save one frame and exit
    Snapshot {
        /// Time to let the camera settle before saving, in milliseconds
        #[arg(long, default_value = "1500")]
        warmup_ms: u64,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Parse and validate a zoom multiplier (finite, > 0)
fn parse_zoom(s: &str) -> Result<f64, String> {
    let zoom: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(format!("Zoom must be greater than 0, got {}", zoom));
    }
    Ok(zoom)
}

/// Parse and validate canvas size (WIDTHxHEIGHT format)
fn parse_canvas_size(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid canvas size '{}'. Use WIDTHxHEIGHT (e.g., 700x500)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in canvas size", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in canvas size", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Canvas width and height must be greater than 0".to_string());
    }
    if width > 7680 || height > 4320 {
        return Err("Canvas size exceeds maximum supported (7680x4320)".to_string());
    }
    Ok((width, height))
}

/// Parse and validate refresh rate (1-240 fps)
fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid frame rate", s))?;
    if !(1..=240).contains(&fps) {
        return Err(format!("Frame rate must be between 1 and 240 fps, got {}", fps));
    }
    Ok(fps)
}

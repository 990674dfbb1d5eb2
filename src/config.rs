//! Configuration file handling for webcam-studio.
//!
//! Loads configuration from `<config dir>/webcam-studio/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render_loop::DEFAULT_FPS;
use crate::studio::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::view::Filter;

/// Configuration file structure for webcam-studio.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct CameraConfig {
    /// Device identifier as printed by `list-cameras`
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub mirror: bool,
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    #[serde(default = "default_canvas_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            fps: DEFAULT_FPS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct ViewConfig {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct ExportConfig {
    /// Watermark image: a file path or an http(s) URL
    #[serde(default)]
    pub watermark: Option<String>,
    /// Directory exports are written to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_zoom() -> f64 {
    1.0
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed or holds invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config = Self::parse(&content).map_err(|e| match e {
                ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ConfigError::Invalid {
                field: "canvas.width/height",
                reason: "must be greater than 0".to_string(),
            });
        }
        if !(1..=240).contains(&self.canvas.fps) {
            return Err(ConfigError::Invalid {
                field: "canvas.fps",
                reason: format!("must be between 1 and 240, got {}", self.canvas.fps),
            });
        }
        if !self.view.zoom.is_finite() || self.view.zoom <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "view.zoom",
                reason: format!("must be a positive number, got {}", self.view.zoom),
            });
        }
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::Invalid { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("webcam-studio").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/webcam-studio/config.toml")
        })
}

/// Commented default configuration written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# webcam-studio configuration

[camera]
# Device id from `webcam-studio list-cameras` (default: first camera)
# device = "0"
# Mirror the image horizontally (selfie mode)
mirror = false

[canvas]
width = 700
height = 500
# Render loop refresh rate
fps = 60

[view]
# original | grayscale | blur
filter = "original"
zoom = 1.0

[export]
# Watermark stamped on saved frames: a file path or an http(s) URL
# watermark = "/path/to/logo.png"
# Where saved frames go (default: your Downloads folder)
# output_dir = "/path/to/dir"
"#;

//! Frame export: snapshot the canvas, stamp the watermark, write a PNG.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use futures_util::StreamExt;
use image::RgbaImage;

use crate::canvas::Canvas;

/// File name used for every export (suffixed on collision).
pub const DOWNLOAD_FILE_NAME: &str = "canvas-image.png";
/// Watermark box width in pixels.
pub const WATERMARK_WIDTH: u32 = 200;
/// Watermark box height in pixels.
pub const WATERMARK_HEIGHT: u32 = 70;
/// Inset of the watermark box from the bottom-right corner.
pub const WATERMARK_MARGIN: u32 = 20;
/// Opacity the watermark is drawn with.
pub const WATERMARK_OPACITY: f32 = 0.5;

/// Errors that can occur while exporting a frame.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Watermark download from {url} failed with status {status}")]
    WatermarkStatus {
        /// URL that was requested
        url: String,
        /// HTTP status code returned
        status: u16,
    },
}

/// Where the watermark image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkSource {
    File(PathBuf),
    Url(String),
}

impl FromStr for WatermarkSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(WatermarkSource::Url(s.to_string()))
        } else {
            Ok(WatermarkSource::File(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for WatermarkSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatermarkSource::File(path) => write!(f, "{}", path.display()),
            WatermarkSource::Url(url) => write!(f, "{}", url),
        }
    }
}

impl WatermarkSource {
    /// Fetch and decode the watermark image.
    pub async fn load(&self, client: &reqwest::Client) -> Result<RgbaImage, ExportError> {
        let bytes = match self {
            WatermarkSource::File(path) => tokio::fs::read(path).await?,
            WatermarkSource::Url(url) => {
                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ExportError::WatermarkStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let mut bytes = Vec::new();
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                bytes
            }
        };
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

/// Draw `watermark` into the fixed bottom-right box of `target` at half opacity.
pub fn stamp_watermark(target: &mut Canvas, watermark: &RgbaImage) {
    let x = target.width() as f64 - WATERMARK_WIDTH as f64 - WATERMARK_MARGIN as f64;
    let y = target.height() as f64 - WATERMARK_HEIGHT as f64 - WATERMARK_MARGIN as f64;

    let previous_alpha = target.global_alpha();
    target.set_global_alpha(WATERMARK_OPACITY);
    target.draw_image(
        watermark,
        x,
        y,
        WATERMARK_WIDTH as f64,
        WATERMARK_HEIGHT as f64,
    );
    target.set_global_alpha(previous_alpha);
}

/// First path in `dir` for `file_name` that does not exist yet.
///
/// `canvas-image.png`, then `canvas-image (1).png`, `canvas-image (2).png`, ...
pub fn next_download_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1u32..)
        .map(|n| match &extension {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Default directory exports are written to.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Turns canvas snapshots into PNG downloads.
#[derive(Debug, Clone)]
pub struct Exporter {
    download_dir: PathBuf,
    file_name: String,
    watermark: Option<WatermarkSource>,
    client: reqwest::Client,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(default_download_dir())
    }
}

impl Exporter {
    /// Exporter writing into `download_dir`, without a watermark.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            watermark: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_watermark(mut self, watermark: Option<WatermarkSource>) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn watermark(&self) -> Option<&WatermarkSource> {
        self.watermark.as_ref()
    }

    /// Build the off-screen export canvas for `canvas`.
    ///
    /// Waits for the watermark to load before stamping it. A watermark that
    /// fails to load is skipped with a warning.
    pub async fn compose(&self, canvas: &Canvas) -> Canvas {
        let mut off_screen = Canvas::new(canvas.width(), canvas.height());
        off_screen.draw_canvas(canvas, 0.0, 0.0);

        if let Some(source) = &self.watermark {
            match source.load(&self.client).await {
                Ok(watermark) => stamp_watermark(&mut off_screen, &watermark),
                Err(e) => log::warn!(
                    "Watermark '{}' could not be loaded, exporting without it: {}",
                    source,
                    e
                ),
            }
        }

        off_screen
    }

    /// Export `canvas` as a PNG and return the path written.
    pub async fn export(&self, canvas: &Canvas) -> Result<PathBuf, ExportError> {
        let off_screen = self.compose(canvas).await;
        let png = off_screen.to_png()?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = next_download_path(&self.download_dir, &self.file_name);
        tokio::fs::write(&path, png).await?;

        log::info!("Exported frame to {}", path.display());
        Ok(path)
    }
}

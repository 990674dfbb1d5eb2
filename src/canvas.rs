//! RGBA drawing surface with a 2D-context style API.
//!
//! A [`Canvas`] holds a pixel buffer plus the two pieces of drawing state the
//! studio needs: the CSS-style `filter` applied to drawn content and the
//! `global_alpha` used when compositing.
//!
//! `draw_image` renders the source into a transparent layer covering the
//! destination rectangle (nearest-neighbour sampling, pixel-centre coverage),
//! runs the filter over the whole layer, then composites it source-over.
//! Because blur runs on the layer, edges fade into transparency exactly like
//! a browser canvas filter does.

use std::fmt;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::{ImageFormat, Rgba, RgbaImage};

/// Canvas shared between the render loop and the exporter.
pub type SharedCanvas = Arc<Mutex<Canvas>>;

/// Parsed form of the context `filter` property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CanvasFilter {
    #[default]
    None,
    /// Grayscale amount in `0.0..=1.0`
    Grayscale(f32),
    /// Gaussian blur standard deviation in pixels
    Blur(f32),
}

impl CanvasFilter {
    /// Parse a CSS filter function string.
    ///
    /// Accepts `none`, `grayscale(<number>|<percentage>)` and `blur(<length>px)`.
    /// Returns `None` for anything else.
    pub fn parse(css: &str) -> Option<Self> {
        let css = css.trim().to_ascii_lowercase();
        if css == "none" {
            return Some(CanvasFilter::None);
        }

        if let Some(arg) = function_arg(&css, "grayscale") {
            let amount = if arg.is_empty() {
                1.0
            } else if let Some(pct) = arg.strip_suffix('%') {
                pct.trim().parse::<f32>().ok()? / 100.0
            } else {
                arg.parse::<f32>().ok()?
            };
            if !amount.is_finite() || amount < 0.0 {
                return None;
            }
            return Some(CanvasFilter::Grayscale(amount.min(1.0)));
        }

        if let Some(arg) = function_arg(&css, "blur") {
            let radius = if arg.is_empty() || arg == "0" {
                0.0
            } else {
                arg.strip_suffix("px")?.trim().parse::<f32>().ok()?
            };
            if !radius.is_finite() || radius < 0.0 {
                return None;
            }
            return Some(CanvasFilter::Blur(radius));
        }

        None
    }
}

fn function_arg<'a>(css: &'a str, name: &str) -> Option<&'a str> {
    css.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

impl fmt::Display for CanvasFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasFilter::None => write!(f, "none"),
            CanvasFilter::Grayscale(amount) => write!(f, "grayscale({}%)", amount * 100.0),
            CanvasFilter::Blur(radius) => write!(f, "blur({}px)", radius),
        }
    }
}

/// A 2D drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    filter: CanvasFilter,
    global_alpha: f32,
}

impl Canvas {
    /// A fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    /// Wrap existing pixels with default drawing state.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            image,
            filter: CanvasFilter::None,
            global_alpha: 1.0,
        }
    }

    /// Wrap this canvas for sharing across threads.
    pub fn shared(self) -> SharedCanvas {
        Arc::new(Mutex::new(self))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn filter(&self) -> CanvasFilter {
        self.filter
    }

    /// Set the filter from a CSS filter string; unrecognized values become `none`.
    pub fn set_filter(&mut self, css: &str) {
        self.filter = CanvasFilter::parse(css).unwrap_or_else(|| {
            log::debug!("Unrecognized canvas filter '{}', using none", css);
            CanvasFilter::None
        });
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    /// Set the compositing alpha. Values outside `0.0..=1.0` are ignored.
    pub fn set_global_alpha(&mut self, alpha: f32) {
        if (0.0..=1.0).contains(&alpha) {
            self.global_alpha = alpha;
        }
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        let (w, h) = (self.width(), self.height());
        self.clear_rect(0, 0, w, h);
    }

    /// Make the pixels of a rectangle transparent (clipped to the canvas).
    pub fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x1 = x.saturating_add(width).min(self.width());
        let y1 = y.saturating_add(height).min(self.height());
        for py in y.min(y1)..y1 {
            for px in x.min(x1)..x1 {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    /// Draw `source` stretched into the destination rectangle.
    ///
    /// The rectangle may extend past the canvas in any direction; only the
    /// visible part is rasterized.
    pub fn draw_image(&mut self, source: &RgbaImage, dx: f64, dy: f64, dw: f64, dh: f64) {
        if source.width() == 0 || source.height() == 0 || self.width() == 0 || self.height() == 0
        {
            return;
        }
        if ![dx, dy, dw, dh].iter().all(|v| v.is_finite()) || dw == 0.0 || dh == 0.0 {
            return;
        }

        let (dx, dw) = if dw < 0.0 { (dx + dw, -dw) } else { (dx, dw) };
        let (dy, dh) = if dh < 0.0 { (dy + dh, -dh) } else { (dy, dh) };

        let (cw, ch) = (self.width(), self.height());
        let x0 = dx.max(0.0).floor() as u32;
        let y0 = dy.max(0.0).floor() as u32;
        let x1 = (dx + dw).ceil().clamp(0.0, cw as f64) as u32;
        let y1 = (dy + dh).ceil().clamp(0.0, ch as f64) as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let (sw, sh) = (source.width(), source.height());
        let mut layer = RgbaImage::new(cw, ch);

        for y in y0..y1 {
            let cy = y as f64 + 0.5;
            if cy < dy || cy >= dy + dh {
                continue;
            }
            let sy = (((cy - dy) / dh * sh as f64) as u32).min(sh - 1);
            for x in x0..x1 {
                let cx = x as f64 + 0.5;
                if cx < dx || cx >= dx + dw {
                    continue;
                }
                let sx = (((cx - dx) / dw * sw as f64) as u32).min(sw - 1);
                layer.put_pixel(x, y, *source.get_pixel(sx, sy));
            }
        }

        let layer = apply_filter(layer, self.filter);
        composite_source_over(&mut self.image, &layer, self.global_alpha);
    }

    /// Draw another canvas at its natural size with its top-left at `(dx, dy)`.
    pub fn draw_canvas(&mut self, other: &Canvas, dx: f64, dy: f64) {
        self.draw_image(
            other.image(),
            dx,
            dy,
            other.width() as f64,
            other.height() as f64,
        );
    }

    /// Encode the current pixels as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn apply_filter(mut layer: RgbaImage, filter: CanvasFilter) -> RgbaImage {
    match filter {
        CanvasFilter::None => layer,
        CanvasFilter::Grayscale(amount) => {
            for pixel in layer.pixels_mut() {
                *pixel = grayscale_pixel(*pixel, amount);
            }
            layer
        }
        CanvasFilter::Blur(radius) if radius > 0.0 => {
            premultiply(&mut layer);
            let mut blurred = image::imageops::blur(&layer, radius);
            unpremultiply(&mut blurred);
            blurred
        }
        CanvasFilter::Blur(_) => layer,
    }
}

/// Filter Effects `grayscale()` colour matrix.
fn grayscale_pixel(pixel: Rgba<u8>, amount: f32) -> Rgba<u8> {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    let [r, g, b, a] = pixel.0;
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let nr = (0.2126 + 0.7874 * inv) * r + (0.7152 - 0.7152 * inv) * g + (0.0722 - 0.0722 * inv) * b;
    let ng = (0.2126 - 0.2126 * inv) * r + (0.7152 + 0.2848 * inv) * g + (0.0722 - 0.0722 * inv) * b;
    let nb = (0.2126 - 0.2126 * inv) * r + (0.7152 - 0.7152 * inv) * g + (0.0722 + 0.9278 * inv) * b;

    Rgba([to_channel(nr), to_channel(ng), to_channel(nb), a])
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn premultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel.0[3] as f32 / 255.0;
        for c in 0..3 {
            pixel.0[c] = to_channel(pixel.0[c] as f32 * a);
        }
    }
}

fn unpremultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel.0[3] as f32 / 255.0;
        if a == 0.0 {
            pixel.0 = [0, 0, 0, 0];
            continue;
        }
        for c in 0..3 {
            pixel.0[c] = to_channel(pixel.0[c] as f32 / a);
        }
    }
}

/// Porter-Duff source-over of `layer` onto `target`, scaled by `global_alpha`.
fn composite_source_over(target: &mut RgbaImage, layer: &RgbaImage, global_alpha: f32) {
    for (dst, src) in target.pixels_mut().zip(layer.pixels()) {
        let sa = src.0[3] as f32 / 255.0 * global_alpha;
        if sa <= 0.0 {
            continue;
        }
        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let blended = (src.0[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_a;
            dst.0[c] = to_channel(blended);
        }
        dst.0[3] = to_channel(out_a * 255.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }

    #[test]
    fn test_parse_known_filters() {
        assert_eq!(CanvasFilter::parse("none"), Some(CanvasFilter::None));
        assert_eq!(
            CanvasFilter::parse("grayscale(100%)"),
            Some(CanvasFilter::Grayscale(1.0))
        );
        assert_eq!(
            CanvasFilter::parse("grayscale(0.5)"),
            Some(CanvasFilter::Grayscale(0.5))
        );
        assert_eq!(CanvasFilter::parse("blur(4px)"), Some(CanvasFilter::Blur(4.0)));
        assert_eq!(CanvasFilter::parse(" BLUR( 2px ) "), Some(CanvasFilter::Blur(2.0)));
    }

    #[test]
    fn test_parse_rejects_unknown_filters() {
        assert_eq!(CanvasFilter::parse("sepia(100%)"), None);
        assert_eq!(CanvasFilter::parse("blur(4em)"), None);
        assert_eq!(CanvasFilter::parse("grayscale(-10%)"), None);
        assert_eq!(CanvasFilter::parse(""), None);
    }

    #[test]
    fn test_filter_display_roundtrips_css() {
        assert_eq!(CanvasFilter::None.to_string(), "none");
        assert_eq!(CanvasFilter::Grayscale(1.0).to_string(), "grayscale(100%)");
        assert_eq!(CanvasFilter::Blur(4.0).to_string(), "blur(4px)");
    }

    #[test]
    fn test_set_filter_falls_back_to_none() {
        let mut canvas = Canvas::new(2, 2);
        canvas.set_filter("blur(4px)");
        assert_eq!(canvas.filter(), CanvasFilter::Blur(4.0));
        canvas.set_filter("hue-rotate(90deg)");
        assert_eq!(canvas.filter(), CanvasFilter::None);
    }

    #[test]
    fn test_global_alpha_ignores_out_of_range() {
        let mut canvas = Canvas::new(1, 1);
        canvas.set_global_alpha(0.5);
        canvas.set_global_alpha(1.5);
        canvas.set_global_alpha(f32::NAN);
        assert_eq!(canvas.global_alpha(), 0.5);
    }

    #[test]
    fn test_clear_rect_is_clipped() {
        let mut canvas = Canvas::from_image(solid(4, 4, [255, 255, 255, 255]));
        canvas.clear_rect(2, 2, 10, 10);
        assert_eq!(canvas.image().get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(canvas.image().get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_image_stretches_to_destination() {
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        source.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let mut canvas = Canvas::new(4, 2);
        canvas.draw_image(&source, 0.0, 0.0, 4.0, 2.0);

        assert_eq!(canvas.image().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(canvas.image().get_pixel(2, 0).0, [0, 0, 255, 255]);
        assert_eq!(canvas.image().get_pixel(3, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_draw_image_offset_leaves_border_transparent() {
        let source = solid(1, 1, [10, 20, 30, 255]);
        let mut canvas = Canvas::new(4, 4);
        canvas.draw_image(&source, 1.0, 1.0, 2.0, 2.0);

        assert_eq!(canvas.image().get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(canvas.image().get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert_eq!(canvas.image().get_pixel(2, 2).0, [10, 20, 30, 255]);
        assert_eq!(canvas.image().get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_image_outside_canvas_draws_nothing() {
        let source = solid(1, 1, [255, 255, 255, 255]);
        let mut canvas = Canvas::new(2, 2);
        canvas.draw_image(&source, 5.0, 5.0, 2.0, 2.0);
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_grayscale_uses_luminance_weights() {
        let source = solid(1, 1, [255, 0, 0, 255]);
        let mut canvas = Canvas::new(1, 1);
        canvas.set_filter("grayscale(100%)");
        canvas.draw_image(&source, 0.0, 0.0, 1.0, 1.0);
        assert_eq!(canvas.image().get_pixel(0, 0).0, [54, 54, 54, 255]);
    }

    #[test]
    fn test_blur_softens_hard_edge() {
        let mut source = solid(20, 20, [0, 0, 0, 255]);
        for y in 0..20 {
            for x in 10..20 {
                source.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let mut canvas = Canvas::new(20, 20);
        canvas.set_filter("blur(4px)");
        canvas.draw_image(&source, 0.0, 0.0, 20.0, 20.0);

        let left = canvas.image().get_pixel(9, 10).0[0];
        let right = canvas.image().get_pixel(10, 10).0[0];
        assert!(left > 0, "dark side should pick up light: {}", left);
        assert!(right < 255, "light side should pick up dark: {}", right);
    }

    #[test]
    fn test_half_alpha_blends_colors() {
        let mut canvas = Canvas::from_image(solid(1, 1, [200, 0, 0, 255]));
        canvas.set_global_alpha(0.5);
        canvas.draw_image(&solid(1, 1, [0, 0, 200, 255]), 0.0, 0.0, 1.0, 1.0);
        assert_eq!(canvas.image().get_pixel(0, 0).0, [100, 0, 100, 255]);
    }

    #[test]
    fn test_to_png_decodes_back() {
        let canvas = Canvas::from_image(solid(3, 2, [1, 2, 3, 255]));
        let png = canvas.to_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }
}

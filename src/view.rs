//! View state: the filter and zoom applied to every rendered frame.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Multiplier applied by the zoom-in control.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
/// Multiplier applied by the zoom-out control.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Visual filter preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    Original,
    Grayscale,
    Blur,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::Original, Filter::Grayscale, Filter::Blur];

    /// CSS filter string handed to the canvas.
    pub fn css(self) -> &'static str {
        match self {
            Filter::Original => "none",
            Filter::Grayscale => "grayscale(100%)",
            Filter::Blur => "blur(4px)",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Original => write!(f, "original"),
            Filter::Grayscale => write!(f, "grayscale"),
            Filter::Blur => write!(f, "blur"),
        }
    }
}

/// Destination rectangle for a video frame on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How each frame is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub filter: Filter,
    /// Zoom multiplier; never clamped
    pub zoom_in_scale: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: Filter::Original,
            zoom_in_scale: 1.0,
        }
    }
}

impl ViewState {
    /// Multiply the zoom by `factor`.
    pub fn zoom(&mut self, factor: f64) {
        self.zoom_in_scale *= factor;
    }

    pub fn zoom_in(&mut self) {
        self.zoom(ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(ZOOM_OUT_FACTOR);
    }

    /// Select a filter. Returns `false` when it was already selected.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        true
    }

    /// Zoomed rectangle centred on the canvas.
    pub fn dest_rect(&self, canvas_width: u32, canvas_height: u32) -> DestRect {
        let (cw, ch) = (canvas_width as f64, canvas_height as f64);
        let width = cw * self.zoom_in_scale;
        let height = ch * self.zoom_in_scale;
        DestRect {
            x: (cw - width) / 2.0,
            y: (ch - height) / 2.0,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_css_mapping() {
        assert_eq!(Filter::Original.css(), "none");
        assert_eq!(Filter::Grayscale.css(), "grayscale(100%)");
        assert_eq!(Filter::Blur.css(), "blur(4px)");
    }

    #[test]
    fn test_zoom_is_product_of_factors() {
        let mut view = ViewState::default();
        view.zoom_in();
        view.zoom_in();
        view.zoom_out();
        let expected = 1.0 * 1.1 * 1.1 * 0.9;
        assert!((view.zoom_in_scale - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_is_not_clamped() {
        let mut view = ViewState::default();
        for _ in 0..100 {
            view.zoom_in();
        }
        assert!(view.zoom_in_scale > 10_000.0);

        let mut view = ViewState::default();
        for _ in 0..100 {
            view.zoom_out();
        }
        assert!(view.zoom_in_scale < 0.0001);
        assert!(view.zoom_in_scale > 0.0);
    }

    #[test]
    fn test_set_filter_reports_change_once() {
        let mut view = ViewState::default();
        assert!(view.set_filter(Filter::Blur));
        assert!(!view.set_filter(Filter::Blur));
        assert_eq!(view.filter, Filter::Blur);
    }

    #[test]
    fn test_dest_rect_identity_at_scale_one() {
        let rect = ViewState::default().dest_rect(700, 500);
        assert_eq!(
            rect,
            DestRect {
                x: 0.0,
                y: 0.0,
                width: 700.0,
                height: 500.0
            }
        );
    }

    #[test]
    fn test_dest_rect_is_centered() {
        let view = ViewState {
            filter: Filter::Original,
            zoom_in_scale: 2.0,
        };
        let rect = view.dest_rect(700, 500);
        assert_eq!(rect.x, -350.0);
        assert_eq!(rect.y, -250.0);
        assert_eq!(rect.width, 1400.0);
        assert_eq!(rect.height, 1000.0);

        let view = ViewState {
            filter: Filter::Original,
            zoom_in_scale: 0.5,
        };
        let rect = view.dest_rect(700, 500);
        assert_eq!(rect.x, 175.0);
        assert_eq!(rect.y, 125.0);
    }

    #[test]
    fn test_filter_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            filter: Filter,
        }
        let w: Wrapper = toml::from_str("filter = \"grayscale\"").unwrap();
        assert_eq!(w.filter, Filter::Grayscale);
    }
}

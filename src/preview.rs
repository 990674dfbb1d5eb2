//! Terminal preview of the canvas using truecolor half-block cells.
//!
//! Each character cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background.

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use image::RgbaImage;
use std::io::{self, Write};

/// Background shown where the canvas is transparent.
const EMPTY: [u8; 3] = [0, 0, 0];

/// Average `image` down to a `width` x `height` grid of RGB cells.
///
/// Transparent pixels are blended against black. Returns an empty vector for
/// degenerate sizes.
pub fn downsample_rgb(image: &RgbaImage, width: u16, height: u16) -> Vec<[u8; 3]> {
    let (img_w, img_h) = image.dimensions();
    if width == 0 || height == 0 || img_w == 0 || img_h == 0 {
        return Vec::new();
    }

    let cell_w = img_w as f32 / width as f32;
    let cell_h = img_h as f32 / height as f32;
    let mut result = Vec::with_capacity(width as usize * height as usize);

    for cy in 0..height {
        for cx in 0..width {
            let start_x = (cx as f32 * cell_w) as u32;
            let end_x = (((cx + 1) as f32 * cell_w) as u32).max(start_x + 1).min(img_w);
            let start_y = (cy as f32 * cell_h) as u32;
            let end_y = (((cy + 1) as f32 * cell_h) as u32).max(start_y + 1).min(img_h);

            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for py in start_y..end_y {
                for px in start_x..end_x {
                    let [r, g, b, a] = image.get_pixel(px, py).0;
                    let a = a as u32;
                    sum[0] += r as u32 * a / 255;
                    sum[1] += g as u32 * a / 255;
                    sum[2] += b as u32 * a / 255;
                    count += 1;
                }
            }

            result.push(if count > 0 {
                [
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]
            } else {
                EMPTY
            });
        }
    }

    result
}

/// Largest cell grid that fits `cols` x `rows` while keeping the image aspect.
///
/// Returns `(columns, pixel_rows)`; pixel rows are twice the text rows used.
pub fn fit_preview(image_width: u32, image_height: u32, cols: u16, rows: u16) -> (u16, u16) {
    if image_width == 0 || image_height == 0 || cols == 0 || rows == 0 {
        return (0, 0);
    }
    let (iw, ih) = (image_width as f32, image_height as f32);
    let max_px_rows = rows as f32 * 2.0;

    let mut width = cols as f32;
    let mut height = width * ih / iw;
    if height > max_px_rows {
        height = max_px_rows;
        width = height * iw / ih;
    }

    let width = (width.floor() as u16).clamp(1, cols);
    // Even number of pixel rows so every text row is full
    let height = ((height.floor() as u16) & !1).clamp(2, rows * 2);
    (width, height)
}

/// Draw the canvas preview starting at the top-left of the screen.
pub fn render_preview<W: Write>(out: &mut W, image: &RgbaImage, cols: u16, rows: u16) -> io::Result<()> {
    let (width, px_rows) = fit_preview(image.width(), image.height(), cols, rows);
    if width == 0 {
        return Ok(());
    }
    let cells = downsample_rgb(image, width, px_rows);

    for text_row in 0..px_rows / 2 {
        out.queue(MoveTo(0, text_row))?;
        let top = (text_row as usize * 2) * width as usize;
        let bottom = top + width as usize;
        for x in 0..width as usize {
            let [tr, tg, tb] = cells[top + x];
            let [br, bg, bb] = cells[bottom + x];
            out.queue(SetForegroundColor(Color::Rgb { r: tr, g: tg, b: tb }))?;
            out.queue(SetBackgroundColor(Color::Rgb { r: br, g: bg, b: bb }))?;
            out.queue(Print('▀'))?;
        }
        out.queue(ResetColor)?;
        out.queue(Clear(ClearType::UntilNewLine))?;
    }

    Ok(())
}

/// Draw one line of text at `row`, clearing the rest of the line.
pub fn render_line<W: Write>(out: &mut W, row: u16, text: &str) -> io::Result<()> {
    out.queue(MoveTo(0, row))?;
    out.queue(ResetColor)?;
    out.queue(Print(text))?;
    out.queue(Clear(ClearType::UntilNewLine))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_downsample_averages_cells() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 100, 255]));

        assert_eq!(downsample_rgb(&image, 1, 1), vec![[100, 0, 50]]);
        assert_eq!(downsample_rgb(&image, 2, 1), vec![[200, 0, 0], [0, 0, 100]]);
    }

    #[test]
    fn test_downsample_transparent_is_black() {
        let image = RgbaImage::new(4, 4);
        assert!(downsample_rgb(&image, 2, 2).iter().all(|c| *c == [0, 0, 0]));
    }

    #[test]
    fn test_downsample_degenerate_sizes() {
        let image = RgbaImage::new(4, 4);
        assert!(downsample_rgb(&image, 0, 2).is_empty());
        assert!(downsample_rgb(&RgbaImage::new(0, 0), 2, 2).is_empty());
    }

    #[test]
    fn test_fit_preview_wide_terminal() {
        // 700x500 into 200x30: height-limited, 60 pixel rows
        let (w, h) = fit_preview(700, 500, 200, 30);
        assert_eq!(h, 60);
        assert_eq!(w, 84);
    }

    #[test]
    fn test_fit_preview_narrow_terminal() {
        // 700x500 into 70x100: width-limited
        let (w, h) = fit_preview(700, 500, 70, 100);
        assert_eq!(w, 70);
        assert_eq!(h, 50);
    }

    #[test]
    fn test_render_preview_writes_half_blocks() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let mut out = Vec::new();
        render_preview(&mut out, &image, 4, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('▀'));
    }
}

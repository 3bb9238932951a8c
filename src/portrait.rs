//! Portraits - backend images decoded into terminal cells
//!
//! Each character/backdrop image becomes a grid of RGB pixels rendered as
//! half-block cells (two pixels per terminal row).

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Character portraits fit this cell budget.
pub const PORTRAIT_COLS: u32 = 24;
pub const PORTRAIT_ROWS: u32 = 14;

/// The backdrop spans most of the scene.
pub const BACKDROP_COLS: u32 = 72;
pub const BACKDROP_ROWS: u32 = 18;

/// A decoded image; `None` pixels were transparent in the source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Portrait {
    pub width: u32,
    pub height: u32,
    /// Row-major; length is `width * height`.
    pub pixels: Vec<Option<[u8; 3]>>,
}

/// Decode image bytes, scaled to fit a cell budget. `max_rows` is in
/// terminal rows; each row stacks two image pixels.
pub fn decode(bytes: &[u8], max_cols: u32, max_rows: u32) -> Result<Portrait, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let img = img.thumbnail(max_cols, max_rows * 2);
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        pixels.push(if a < 128 { None } else { Some([r, g, b]) });
    }
    Ok(Portrait {
        width,
        height,
        pixels,
    })
}

impl Portrait {
    pub fn rows(&self) -> u16 {
        self.height.div_ceil(2) as u16
    }

    pub fn cols(&self) -> u16 {
        self.width as u16
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .flatten()
    }

    /// Render as half-block lines, one line per two pixel rows.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        (0..self.height.div_ceil(2))
            .map(|row| {
                let spans: Vec<Span<'static>> = (0..self.width)
                    .map(|x| {
                        let top = self.pixel(x, row * 2);
                        let bottom = self.pixel(x, row * 2 + 1);
                        match (top, bottom) {
                            (None, None) => Span::raw(" "),
                            (Some(t), Some(b)) => Span::styled(
                                "\u{2580}",
                                Style::default().fg(rgb(t)).bg(rgb(b)),
                            ),
                            (Some(t), None) => {
                                Span::styled("\u{2580}", Style::default().fg(rgb(t)))
                            }
                            (None, Some(b)) => {
                                Span::styled("\u{2584}", Style::default().fg(rgb(b)))
                            }
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_opaque_image() {
        let bytes = png_bytes(4, 4, Rgba([200, 40, 40, 255]));
        let portrait = decode(&bytes, 24, 14).unwrap();

        assert_eq!(portrait.width, 4);
        assert_eq!(portrait.height, 4);
        assert!(portrait.pixels.iter().all(|p| *p == Some([200, 40, 40])));
    }

    #[test]
    fn test_decode_scales_down_to_budget() {
        let bytes = png_bytes(200, 200, Rgba([10, 10, 10, 255]));
        let portrait = decode(&bytes, 24, 14).unwrap();

        assert!(portrait.width <= 24);
        assert!(portrait.height <= 28);
        assert_eq!(
            portrait.pixels.len(),
            (portrait.width * portrait.height) as usize
        );
    }

    #[test]
    fn test_transparent_pixels_become_none() {
        let bytes = png_bytes(2, 2, Rgba([0, 0, 0, 0]));
        let portrait = decode(&bytes, 24, 14).unwrap();

        assert!(portrait.pixels.iter().all(|p| p.is_none()));
        // Fully transparent rows render as blank cells
        let lines = portrait.to_lines();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"not an image", 24, 14).is_err());
    }

    #[test]
    fn test_to_lines_row_count() {
        let bytes = png_bytes(4, 5, Rgba([1, 2, 3, 255]));
        let portrait = decode(&bytes, 24, 14).unwrap();
        // 5 pixel rows pack into 3 half-block lines
        assert_eq!(portrait.to_lines().len(), 3);
        assert_eq!(portrait.rows(), 3);
    }
}

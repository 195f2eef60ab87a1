//! Overlay rendering
//!
//! One pixel per grid cell; the host scales the frame up to document size.

use crate::color::{BlendMode, Palette, Theme};
use crate::grid::SpatialGrid;
use std::io::Write;

/// RGBA pixel buffer for the heat overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    pub blend_mode: BlendMode,
    /// Size the frame should be stretched to on the page
    pub display_width: f64,
    pub display_height: f64,
}

impl OverlayFrame {
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Write the frame as binary PPM, compositing alpha onto a background colour
    pub fn write_ppm<W: Write>(&self, out: &mut W, background: [u8; 3]) -> std::io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for px in self.pixels.chunks_exact(4) {
            let alpha = px[3] as f64 / 255.0;
            for c in 0..3 {
                let composed = match self.blend_mode {
                    BlendMode::Multiply => px[c] as f64 * background[c] as f64 / 255.0,
                    BlendMode::Normal => {
                        px[c] as f64 * alpha + background[c] as f64 * (1.0 - alpha)
                    }
                };
                rgb.push(composed.round().clamp(0.0, 255.0) as u8);
            }
        }
        out.write_all(&rgb)
    }
}

/// Render the grid through the palette
pub fn render_grid(
    grid: &SpatialGrid,
    palette: &Palette<'_>,
    display_width: f64,
    display_height: f64,
) -> OverlayFrame {
    let mut pixels = Vec::with_capacity(grid.values().len() * 4);
    for &score in grid.values() {
        pixels.extend_from_slice(&palette.map(score as f64));
    }
    OverlayFrame {
        width: grid.cols(),
        height: grid.rows(),
        pixels,
        blend_mode: palette.theme().blend_mode(),
        display_width,
        display_height,
    }
}

/// Page background assumed when flattening a frame for a theme
pub fn theme_backdrop(theme: Theme) -> [u8; 3] {
    match theme {
        Theme::Light => [255, 255, 255],
        Theme::Dark => [24, 24, 27],
    }
}

//! Colour mapping and theme detection
//!
//! Grid scores map to RGBA through a piecewise-linear gradient. Which gradient
//! is used depends on the page background, detected once per session.

use crate::types::ThemeSample;
use serde::{Deserialize, Serialize};

/// One gradient stop: position in `[0, 1]` and `[r, g, b, a]` with alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub pos: f64,
    pub color: [f64; 4],
}

impl ColorStop {
    pub fn new(pos: f64, color: [f64; 4]) -> Self {
        Self { pos, color }
    }
}

/// Page colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// How the overlay is composited onto the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// White is the identity colour; darker stops tint the page
    Multiply,
    /// Plain alpha blending
    Normal,
}

impl Theme {
    pub fn blend_mode(self) -> BlendMode {
        match self {
            Theme::Light => BlendMode::Multiply,
            Theme::Dark => BlendMode::Normal,
        }
    }
}

/// Gradient selected for a theme
#[derive(Debug, Clone, PartialEq)]
pub struct Palette<'a> {
    theme: Theme,
    stops: &'a [ColorStop],
    max_score: f64,
    min_render_score: f64,
}

impl<'a> Palette<'a> {
    pub fn new(theme: Theme, stops: &'a [ColorStop], max_score: f64, min_render_score: f64) -> Self {
        Self {
            theme,
            stops,
            max_score,
            min_render_score,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// RGBA bytes for a grid score
    pub fn map(&self, score: f64) -> [u8; 4] {
        if score < self.min_render_score {
            return self.background();
        }
        let t = (score / self.max_score).min(1.0);
        self.sample(t)
    }

    /// Colour used for cells below the render threshold
    pub fn background(&self) -> [u8; 4] {
        match self.theme {
            Theme::Light => [255, 255, 255, 255],
            Theme::Dark => [0, 0, 0, 0],
        }
    }

    /// Interpolate the gradient at `t` in `[0, 1]`
    pub fn sample(&self, t: f64) -> [u8; 4] {
        let Some((first, last)) = self.stops.first().zip(self.stops.last()) else {
            return self.background();
        };

        let (lower, upper) = self
            .stops
            .windows(2)
            .find(|w| t >= w[0].pos && t <= w[1].pos)
            .map(|w| (w[0], w[1]))
            .unwrap_or((*first, *last));

        let span = upper.pos - lower.pos;
        let local_t = if span > 0.0 { (t - lower.pos) / span } else { 0.0 };
        let lerp = |i: usize| lower.color[i] + (upper.color[i] - lower.color[i]) * local_t;

        [
            channel(lerp(0)),
            channel(lerp(1)),
            channel(lerp(2)),
            channel(lerp(3) * 255.0),
        ]
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)` into `[r, g, b, a]`
pub fn parse_css_color(value: &str) -> Option<[f64; 4]> {
    let value = value.trim();
    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }

    let mut rgba = [0.0, 0.0, 0.0, 1.0];
    for (i, part) in parts.iter().enumerate() {
        let parsed: f64 = part.parse().ok()?;
        if !parsed.is_finite() || parsed < 0.0 {
            return None;
        }
        rgba[i] = parsed;
    }
    Some(rgba)
}

/// Perceptual luminance in `[0, 1]` (`0.299R + 0.587G + 0.114B`)
pub fn perceptual_luminance(rgb: [f64; 4]) -> f64 {
    (0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]) / 255.0
}

fn opaque(value: &str) -> Option<[f64; 4]> {
    parse_css_color(value).filter(|c| c[3] != 0.0)
}

/// Pick a theme from the page background.
///
/// Order: body, root, then each sample chain from the hit element upward. A page
/// with no opaque background anywhere is treated as white.
pub fn detect_theme(sample: &ThemeSample) -> (Theme, f64) {
    let background = sample
        .body_background
        .as_deref()
        .and_then(opaque)
        .or_else(|| sample.root_background.as_deref().and_then(opaque))
        .or_else(|| {
            sample
                .sample_chains
                .iter()
                .flat_map(|chain| chain.iter())
                .find_map(|bg| opaque(bg))
        })
        .unwrap_or([255.0, 255.0, 255.0, 1.0]);

    let luminance = perceptual_luminance(background);
    let theme = if luminance > 0.5 { Theme::Light } else { Theme::Dark };
    (theme, luminance)
}

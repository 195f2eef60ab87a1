//! Session configuration
//!
//! Every tunable constant of the engine lives here. A config is handed to a
//! session at construction and stays fixed for the session's lifetime.

use crate::color::ColorStop;
use crate::error::HeatGridError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Priority weight for tags missing from the priority table
pub const DEFAULT_PRIORITY_WEIGHT: f64 = 0.5;

/// Tags queried from the document on every rescan
pub const TRACKED_TAGS: &[&str] = &[
    "H1", "H2", "H3", "H4", "H5", "H6", "P", "A", "LI", "BUTTON", "INPUT", "TEXTAREA", "SELECT",
    "LABEL", "SPAN", "STRONG", "EM", "B", "I", "BLOCKQUOTE", "ARTICLE", "CODE", "PRE", "TD", "TH",
    "FIGCAPTION", "CAPTION", "LEGEND", "SUMMARY", "DETAILS", "MARK", "TIME", "SMALL",
];

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatGridConfig {
    /// Edge length of a grid cell in pixels
    pub cell_size: f64,
    /// Period of the attention/heat/rebuild tick in milliseconds
    pub tick_interval_ms: i64,
    /// Period of the active-time tick in milliseconds
    pub activity_interval_ms: i64,
    /// Radius of mouse heat diffusion in pixels
    pub mouse_influence_radius: f64,
    /// Base dwell gained per tick by a visible element of weight 1.0
    pub dwell_increment: f64,
    /// Cap for dwell scores and heat intensities
    pub max_dwell_score: f64,
    /// Heat deposited per tick while the pointer is moving (scaled by 0.25)
    pub mouse_heat_strength: f64,
    /// Heat deposited by a click
    pub click_boost: f64,
    /// Grid values below this render as background
    pub min_render_score: f64,
    /// Multiplicative heat decay applied every tick
    pub heat_decay: f64,
    /// Heat entries below this are dropped
    pub heat_floor: f64,
    /// Trailing debounce window for DOM mutations in milliseconds
    pub mutation_debounce_ms: i64,
    /// Refresh period of the pinned panel in milliseconds
    pub panel_refresh_ms: i64,
    /// Active time only accrues if the last interaction is younger than this
    pub idle_cutoff_ms: i64,
    /// Pointer must have moved this recently to boost the element under it
    pub pointer_dwell_window_ms: i64,
    /// Pointer must have moved this recently to deposit heat on a tick
    pub pointer_heat_window_ms: i64,
    /// Scroll speed (px/s) at which accrual is fully suppressed
    pub scroll_suppression_speed: f64,
    /// Per-tag priority weights (uppercase tag names)
    pub priority_weights: BTreeMap<String, f64>,
    /// Gradient used on light pages (composited with multiply)
    pub color_stops_light: Vec<ColorStop>,
    /// Gradient used on dark pages (alpha-blended)
    pub color_stops_dark: Vec<ColorStop>,
}

impl Default for HeatGridConfig {
    fn default() -> Self {
        Self {
            cell_size: 15.0,
            tick_interval_ms: 500,
            activity_interval_ms: 1000,
            mouse_influence_radius: 150.0,
            dwell_increment: 0.8,
            max_dwell_score: 5.0,
            mouse_heat_strength: 5.0,
            click_boost: 2.5,
            min_render_score: 0.01,
            heat_decay: 0.96,
            heat_floor: 0.1,
            mutation_debounce_ms: 2000,
            panel_refresh_ms: 2000,
            idle_cutoff_ms: 5000,
            pointer_dwell_window_ms: 3000,
            pointer_heat_window_ms: 2000,
            scroll_suppression_speed: 1500.0,
            priority_weights: default_priority_weights(),
            color_stops_light: default_light_stops(),
            color_stops_dark: default_dark_stops(),
        }
    }
}

impl HeatGridConfig {
    /// Priority weight for a tag name (case-insensitive)
    pub fn priority_weight(&self, tag: &str) -> f64 {
        self.priority_weights
            .get(&tag.to_ascii_uppercase())
            .copied()
            .unwrap_or(DEFAULT_PRIORITY_WEIGHT)
    }

    /// Check the config for values the engine cannot run with
    pub fn validate(&self) -> Result<(), HeatGridError> {
        if !(self.cell_size > 0.0) {
            return Err(HeatGridError::InvalidConfig(
                "cell_size must be positive".to_string(),
            ));
        }
        if self.tick_interval_ms <= 0 || self.activity_interval_ms <= 0 || self.panel_refresh_ms <= 0 {
            return Err(HeatGridError::InvalidConfig(
                "timer intervals must be positive".to_string(),
            ));
        }
        if !(self.heat_decay > 0.0 && self.heat_decay < 1.0) {
            return Err(HeatGridError::InvalidConfig(format!(
                "heat_decay must be in (0, 1), got {}",
                self.heat_decay
            )));
        }
        if !(self.max_dwell_score > 0.0) || !(self.mouse_influence_radius > 0.0) {
            return Err(HeatGridError::InvalidConfig(
                "max_dwell_score and mouse_influence_radius must be positive".to_string(),
            ));
        }
        for (name, stops) in [
            ("color_stops_light", &self.color_stops_light),
            ("color_stops_dark", &self.color_stops_dark),
        ] {
            if stops.len() < 2 {
                return Err(HeatGridError::InvalidConfig(format!(
                    "{} needs at least two stops",
                    name
                )));
            }
            if stops.windows(2).any(|w| w[0].pos > w[1].pos) {
                return Err(HeatGridError::InvalidConfig(format!(
                    "{} must be sorted by position",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Load a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, HeatGridError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON
    pub fn to_json(&self) -> Result<String, HeatGridError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn default_priority_weights() -> BTreeMap<String, f64> {
    [
        ("BUTTON", 2.0),
        ("A", 1.8),
        ("INPUT", 1.7),
        ("TEXTAREA", 1.7),
        ("SELECT", 1.6),
        ("SUMMARY", 1.5),
        ("DETAILS", 1.5),
        ("H1", 1.4),
        ("H2", 1.3),
        ("H3", 1.2),
        ("H4", 1.1),
        ("H5", 1.1),
        ("H6", 1.1),
        ("P", 1.0),
        ("ARTICLE", 1.0),
        ("BLOCKQUOTE", 1.0),
        ("LI", 0.9),
        ("TD", 0.9),
        ("TH", 0.9),
        ("MARK", 0.9),
        ("STRONG", 0.8),
        ("EM", 0.8),
        ("B", 0.8),
        ("CODE", 0.8),
        ("PRE", 0.8),
        ("I", 0.7),
        ("LABEL", 0.7),
        ("FIGCAPTION", 0.6),
        ("CAPTION", 0.6),
        ("LEGEND", 0.6),
        ("TIME", 0.5),
        ("SMALL", 0.5),
        ("SPAN", 0.4),
    ]
    .into_iter()
    .map(|(tag, weight)| (tag.to_string(), weight))
    .collect()
}

fn default_dark_stops() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, [100.0, 150.0, 255.0, 0.0]),
        ColorStop::new(0.1, [120.0, 180.0, 255.0, 0.20]),
        ColorStop::new(0.25, [150.0, 200.0, 255.0, 0.30]),
        ColorStop::new(0.4, [180.0, 220.0, 255.0, 0.38]),
        ColorStop::new(0.55, [200.0, 240.0, 200.0, 0.45]),
        ColorStop::new(0.7, [255.0, 240.0, 180.0, 0.50]),
        ColorStop::new(0.85, [255.0, 200.0, 150.0, 0.55]),
        ColorStop::new(1.0, [255.0, 160.0, 130.0, 0.60]),
    ]
}

// Opaque: white is the identity colour under multiply.
fn default_light_stops() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, [255.0, 255.0, 255.0, 1.0]),
        ColorStop::new(0.1, [200.0, 220.0, 255.0, 1.0]),
        ColorStop::new(0.25, [140.0, 190.0, 255.0, 1.0]),
        ColorStop::new(0.4, [100.0, 200.0, 220.0, 1.0]),
        ColorStop::new(0.55, [140.0, 220.0, 130.0, 1.0]),
        ColorStop::new(0.7, [220.0, 220.0, 80.0, 1.0]),
        ColorStop::new(0.85, [255.0, 150.0, 60.0, 1.0]),
        ColorStop::new(1.0, [255.0, 80.0, 40.0, 1.0]),
    ]
}

//! Readability sub-scores from computed text styles

use crate::catalog::TrackedElement;
use crate::color::parse_css_color;
use crate::types::parse_css_px;

/// Tags that carry body text
pub const READABLE_TAGS: &[&str] = &[
    "P", "LI", "SPAN", "A", "LABEL", "TD", "TH", "BLOCKQUOTE", "ARTICLE",
];

const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_LINE_HEIGHT: f64 = 1.5;
const DEFAULT_LINE_LENGTH: f64 = 60.0;
const DEFAULT_CONTRAST_SCORE: f64 = 80.0;

/// Averages of the collected style samples and their 0-100 scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadabilityMetrics {
    /// px
    pub font_size: f64,
    /// Line height as a multiple of font size
    pub line_height: f64,
    /// Estimated characters per line
    pub line_length: f64,
    /// WCAG contrast ratio; `None` when no element had both colours
    pub contrast: Option<f64>,
    pub font_size_score: f64,
    pub line_height_score: f64,
    pub line_length_score: f64,
    pub contrast_score: f64,
    /// Mean of the four sub-scores, integer valued
    pub score: f64,
}

#[derive(Default)]
struct Samples {
    font_sizes: Vec<f64>,
    line_heights: Vec<f64>,
    line_lengths: Vec<f64>,
    contrasts: Vec<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// WCAG relative luminance of an sRGB colour
pub fn relative_luminance(rgb: [f64; 4]) -> f64 {
    let linear = |c: f64| {
        let c = c / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(rgb[0]) + 0.7152 * linear(rgb[1]) + 0.0722 * linear(rgb[2])
}

/// WCAG contrast ratio between two colours, `>= 1`
pub fn contrast_ratio(a: [f64; 4], b: [f64; 4]) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    (la.max(lb) + 0.05) / (la.min(lb) + 0.05)
}

fn collect(elements: &[TrackedElement]) -> Samples {
    let mut samples = Samples::default();

    for element in elements {
        if !READABLE_TAGS.contains(&element.tag.as_str()) {
            continue;
        }
        let Some(style) = &element.style else {
            continue;
        };

        let font_size = parse_css_px(&style.font_size).filter(|fs| *fs > 0.0);
        if let Some(fs) = font_size {
            samples.font_sizes.push(fs);
            if let Some(lh) = parse_css_px(&style.line_height).filter(|lh| *lh > 0.0) {
                samples.line_heights.push(lh / fs);
            }
            if element.rect.width > 0.0 {
                samples.line_lengths.push(element.rect.width / (fs * 0.5));
            }
        }

        // Alpha is ignored: a transparent background still counts by its channels
        let fg = parse_css_color(&style.color);
        let bg = parse_css_color(&style.background_color);
        if let (Some(fg), Some(bg)) = (fg, bg) {
            let ratio = contrast_ratio(fg, bg);
            if ratio > 1.0 {
                samples.contrasts.push(ratio);
            }
        }
    }

    samples
}

pub fn font_size_score(font_size: f64) -> f64 {
    ((font_size - 8.0) / 8.0 * 100.0).clamp(0.0, 100.0)
}

pub fn line_height_score(ratio: f64) -> f64 {
    if (1.2..=2.0).contains(&ratio) {
        100.0
    } else if ratio < 1.2 {
        ((ratio - 1.0) / 0.2 * 100.0).max(0.0)
    } else {
        (100.0 - (ratio - 2.0) / 0.5 * 50.0).max(0.0)
    }
}

pub fn line_length_score(chars: f64) -> f64 {
    if (35.0..=90.0).contains(&chars) {
        100.0
    } else if chars < 35.0 {
        (chars / 35.0 * 100.0).max(0.0)
    } else {
        (100.0 - (chars - 90.0) / 50.0 * 100.0).max(0.0)
    }
}

pub fn contrast_score(ratio: Option<f64>) -> f64 {
    match ratio {
        None => DEFAULT_CONTRAST_SCORE,
        Some(r) if r >= 7.0 => 100.0,
        Some(r) if r >= 4.5 => 70.0 + (r - 4.5) / 2.5 * 30.0,
        Some(r) => (r / 4.5 * 70.0).max(0.0),
    }
}

pub fn measure_readability(elements: &[TrackedElement]) -> ReadabilityMetrics {
    let samples = collect(elements);

    let font_size = mean(&samples.font_sizes).unwrap_or(DEFAULT_FONT_SIZE);
    let line_height = mean(&samples.line_heights).unwrap_or(DEFAULT_LINE_HEIGHT);
    let line_length = mean(&samples.line_lengths).unwrap_or(DEFAULT_LINE_LENGTH);
    let contrast = mean(&samples.contrasts);

    let fs_score = font_size_score(font_size);
    let lh_score = line_height_score(line_height);
    let ll_score = line_length_score(line_length);
    let cr_score = contrast_score(contrast);

    ReadabilityMetrics {
        font_size,
        line_height,
        line_length,
        contrast,
        font_size_score: fs_score,
        line_height_score: lh_score,
        line_length_score: ll_score,
        contrast_score: cr_score,
        score: ((fs_score + lh_score + ll_score + cr_score) / 4.0).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComputedStyle, NodeId, Rect};

    fn paragraph(width: f64, style: ComputedStyle) -> TrackedElement {
        TrackedElement {
            node: NodeId(1),
            tag: "P".to_string(),
            rect: Rect::new(0.0, 0.0, width, 40.0),
            dwell_score: 0.0,
            priority_weight: 1.0,
            visible: true,
            style: Some(style),
        }
    }

    fn style(font_size: &str, line_height: &str, color: &str, background: &str) -> ComputedStyle {
        ComputedStyle {
            font_size: font_size.to_string(),
            line_height: line_height.to_string(),
            color: color.to_string(),
            background_color: background.to_string(),
        }
    }

    #[test]
    fn test_defaults_without_samples() {
        let m = measure_readability(&[]);
        assert_eq!(m.font_size, 16.0);
        assert_eq!(m.contrast, None);
        assert_eq!(m.contrast_score, 80.0);
        assert_eq!(m.score, 95.0);
    }

    #[test]
    fn test_comfortable_body_text() {
        let elements = vec![paragraph(
            640.0,
            style("16px", "24px", "rgb(0, 0, 0)", "rgb(255, 255, 255)"),
        )];
        let m = measure_readability(&elements);
        assert_eq!(m.line_height, 1.5);
        assert_eq!(m.line_length, 80.0);
        assert!((m.contrast.unwrap() - 21.0).abs() < 1e-9);
        assert_eq!(m.score, 100.0);
    }

    #[test]
    fn test_small_cramped_text() {
        let elements = vec![paragraph(
            1200.0,
            style("10px", "normal", "rgb(120, 120, 120)", "rgba(0, 0, 0, 0)"),
        )];
        let m = measure_readability(&elements);
        assert_eq!(m.font_size_score, 25.0);
        // "normal" has no pixel value: default ratio
        assert_eq!(m.line_height, 1.5);
        // 1200 / 5 = 240 chars
        assert_eq!(m.line_length_score, 0.0);
        // grey on transparent black, about 4.76:1
        let contrast = m.contrast.unwrap();
        assert!((contrast - 4.756).abs() < 0.01);
        assert!((m.contrast_score - 73.08).abs() < 0.01);
    }

    #[test]
    fn test_transparent_background_still_scores_contrast() {
        let elements = vec![paragraph(
            640.0,
            style("16px", "24px", "rgb(20, 20, 20)", "rgba(0, 0, 0, 0)"),
        )];
        let m = measure_readability(&elements);
        let contrast = m.contrast.unwrap();
        assert!((contrast - 1.140).abs() < 0.001);
        assert!((m.contrast_score - 17.7).abs() < 0.1);
        // (100 + 100 + 100 + 17.7) / 4
        assert_eq!(m.score, 79.0);
    }

    #[test]
    fn test_missing_colors_use_neutral_contrast() {
        let elements = vec![paragraph(640.0, style("16px", "24px", "", "rgba(0, 0, 0, 0)"))];
        let m = measure_readability(&elements);
        assert_eq!(m.contrast, None);
        assert_eq!(m.contrast_score, 80.0);
    }

    #[test]
    fn test_sub_score_curves() {
        assert!((line_height_score(1.1) - 50.0).abs() < 1e-9);
        assert_eq!(line_height_score(0.9), 0.0);
        assert_eq!(line_height_score(3.0), 0.0);
        assert_eq!(line_height_score(2.5), 50.0);
        assert_eq!(line_length_score(17.5), 50.0);
        assert_eq!(line_length_score(115.0), 50.0);
        assert_eq!(contrast_score(Some(4.5)), 70.0);
        assert_eq!(contrast_score(Some(9.0)), 100.0);
    }

    #[test]
    fn test_non_text_tags_ignored() {
        let mut heading = paragraph(100.0, style("8px", "8px", "rgb(0,0,0)", "rgb(0,0,1)"));
        heading.tag = "H1".to_string();
        let m = measure_readability(&[heading]);
        assert_eq!(m.font_size, 16.0);
    }
}

//! UX density evaluation
//!
//! A pure function of the tracked elements and the page geometry. Tracking
//! history (dwell, heat) is never consulted, so the same layout always yields
//! the same evaluation.
//!
//! Four categories contribute up to 25 points each:
//! density, white space, complexity and readability.

pub mod density;
pub mod feedback;
pub mod readability;
pub mod scoring;
pub mod types;

pub use feedback::{build_feedback, FeedbackSet};
pub use types::{CategoryPoints, Feedback, FeedbackCategory, UxEvaluation, UxLabel};

use crate::catalog::{ElementCatalog, TrackedElement};
use crate::config::HeatGridConfig;
use crate::error::HeatGridError;
use crate::host::PageHost;
use crate::types::PageMetrics;
use density::DensityMetrics;
use readability::ReadabilityMetrics;
use scoring::{round_u32, COMPLEXITY, WHITE_SPACE};

const HEADING_TAGS: &[&str] = &["H1", "H2", "H3", "H4", "H5", "H6"];
const PARAGRAPH_TAGS: &[&str] = &["P", "LI", "ARTICLE"];

/// Page dimensions the evaluator works against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Never below 1px
    pub viewport_height: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64, viewport_height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            viewport_height: viewport_height.max(1.0),
        }
    }

    pub fn from_metrics(metrics: &PageMetrics) -> Self {
        Self::new(
            metrics.document_width,
            metrics.document_height,
            metrics.viewport_height,
        )
    }

    /// Number of viewport-height slices covering the page, at least one
    pub fn screen_count(&self) -> usize {
        ((self.height / self.viewport_height).ceil() as usize).max(1)
    }
}

/// Every intermediate value behind an evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct UxMetrics {
    pub density: DensityMetrics,
    /// px
    pub average_gap: f64,
    pub white_space_ratio: f64,
    pub elements_per_screen: f64,
    pub readability: ReadabilityMetrics,
    pub heading_count: usize,
    pub paragraph_count: usize,
    pub points: CategoryPoints,
}

impl UxMetrics {
    /// Total score, 0-100
    pub fn score(&self) -> u32 {
        round_u32(self.points.total()).min(100)
    }

    pub fn to_evaluation(&self) -> UxEvaluation {
        let score = self.score();
        let FeedbackSet {
            issues,
            suggestions,
            positives,
        } = build_feedback(self);

        UxEvaluation {
            score,
            label: UxLabel::from_score(score),
            text_density: round_u32(self.density.overall),
            white_space_ratio: round_u32(self.white_space_ratio),
            elements_per_screen: (self.elements_per_screen * 10.0).round() / 10.0,
            readability: round_u32(self.readability.score),
            issues,
            suggestions,
            positives,
        }
    }
}

/// Compute all metrics for a layout
pub fn measure(elements: &[TrackedElement], page: &PageGeometry) -> UxMetrics {
    let counted = density::counted_rects(elements);
    let density = density::measure_density(&counted, page);

    let average_gap = density::average_block_gap(elements);
    let white_space_ratio = density::white_space_ratio(average_gap);
    let elements_per_screen = density::elements_per_screen(elements.len(), page);
    let readability = readability::measure_readability(elements);

    let heading_count = elements
        .iter()
        .filter(|e| HEADING_TAGS.contains(&e.tag.as_str()))
        .count();
    let paragraph_count = elements
        .iter()
        .filter(|e| PARAGRAPH_TAGS.contains(&e.tag.as_str()))
        .count();

    let points = CategoryPoints {
        density: density.composite / 100.0 * 25.0,
        white_space: WHITE_SPACE.score(white_space_ratio, 25.0),
        complexity: COMPLEXITY.score(elements_per_screen, 25.0),
        readability: (readability.score / 100.0 * 25.0).min(25.0),
    };

    UxMetrics {
        density,
        average_gap,
        white_space_ratio,
        elements_per_screen,
        readability,
        heading_count,
        paragraph_count,
        points,
    }
}

/// Evaluate a layout
pub fn evaluate(elements: &[TrackedElement], page: &PageGeometry) -> UxEvaluation {
    measure(elements, page).to_evaluation()
}

/// Scan a page and evaluate it without any tracking session
pub fn evaluate_page<H: PageHost + ?Sized>(
    host: &H,
    config: &HeatGridConfig,
) -> Result<UxEvaluation, HeatGridError> {
    let metrics = host.metrics()?;
    let mut catalog = ElementCatalog::new();
    catalog.rescan(host, config)?;
    Ok(evaluate(catalog.elements(), &PageGeometry::from_metrics(&metrics)))
}

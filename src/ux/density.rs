//! Layout metrics: text density, white space and complexity

use super::scoring::{FOLD_DENSITY, OVERALL_DENSITY};
use super::PageGeometry;
use crate::catalog::TrackedElement;
use crate::types::Rect;

/// Tags whose vertical gaps define white space
pub const BLOCK_TAGS: &[&str] = &[
    "P", "H1", "H2", "H3", "H4", "H5", "H6", "LI", "BLOCKQUOTE", "ARTICLE",
];

/// Gap (px) that counts as 100% white space
pub const WHITE_SPACE_REFERENCE_PX: f64 = 48.0;

/// Density sub-metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityMetrics {
    /// Percent of the page covered by text boxes
    pub overall: f64,
    /// Percent of the first viewport covered by text boxes
    pub above_fold: f64,
    /// 0-100, integer valued; 100 when every screen slice is equally dense
    pub consistency: f64,
    pub overall_score: f64,
    pub fold_score: f64,
    /// Weighted composite, 0-100
    pub composite: f64,
}

/// Largest rectangles first, skipping any fully contained in one already counted
pub fn counted_rects(elements: &[TrackedElement]) -> Vec<Rect> {
    let mut by_area: Vec<Rect> = elements.iter().map(|e| e.rect).collect();
    by_area.sort_by(|a, b| b.area().total_cmp(&a.area()));

    let mut counted: Vec<Rect> = Vec::new();
    for rect in by_area {
        if !counted.iter().any(|parent| parent.contains_rect(&rect)) {
            counted.push(rect);
        }
    }
    counted
}

/// Area of `rect` between two horizontal lines
fn area_between(rect: &Rect, top: f64, bottom: f64) -> f64 {
    let visible_top = rect.top.max(top);
    let visible_bottom = rect.bottom().min(bottom);
    if visible_bottom > visible_top {
        rect.width * (visible_bottom - visible_top)
    } else {
        0.0
    }
}

fn percent_of(area: f64, total: f64) -> f64 {
    if total > 0.0 {
        (area / total * 100.0).min(100.0)
    } else {
        0.0
    }
}

pub fn measure_density(counted: &[Rect], page: &PageGeometry) -> DensityMetrics {
    let w = page.width;
    let h = page.height;
    let vh = page.viewport_height;

    let total_area: f64 = counted.iter().map(Rect::area).sum();
    let overall = percent_of(total_area, w * h);

    let fold_area: f64 = counted.iter().map(|r| area_between(r, 0.0, vh)).sum();
    let above_fold = percent_of(fold_area, w * vh);

    let screens = page.screen_count();
    let slices: Vec<f64> = (0..screens)
        .map(|s| {
            let top = s as f64 * vh;
            let area: f64 = counted.iter().map(|r| area_between(r, top, top + vh)).sum();
            percent_of(area, w * vh)
        })
        .collect();
    let mean = slices.iter().sum::<f64>() / slices.len() as f64;
    let variance = slices.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / slices.len() as f64;
    let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
    let consistency = ((1.0 - cv) * 100.0).clamp(0.0, 100.0).round();

    let overall_score = OVERALL_DENSITY.score(overall, 100.0);
    let fold_score = FOLD_DENSITY.score(above_fold, 100.0);
    let composite = overall_score * 0.4 + fold_score * 0.35 + consistency * 0.25;

    DensityMetrics {
        overall,
        above_fold,
        consistency,
        overall_score,
        fold_score,
        composite,
    }
}

/// Average non-negative gap between consecutive block elements, top to bottom
pub fn average_block_gap(elements: &[TrackedElement]) -> f64 {
    let mut blocks: Vec<&Rect> = elements
        .iter()
        .filter(|e| BLOCK_TAGS.contains(&e.tag.as_str()))
        .map(|e| &e.rect)
        .collect();
    blocks.sort_by(|a, b| a.top.total_cmp(&b.top));

    let gaps: Vec<f64> = blocks
        .windows(2)
        .map(|pair| pair[1].top - pair[0].bottom())
        .filter(|gap| *gap >= 0.0)
        .collect();

    if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    }
}

/// White-space ratio in percent, integer valued
pub fn white_space_ratio(average_gap: f64) -> f64 {
    (average_gap / WHITE_SPACE_REFERENCE_PX * 100.0)
        .clamp(0.0, 100.0)
        .round()
}

/// Tracked elements per viewport height
pub fn elements_per_screen(count: usize, page: &PageGeometry) -> f64 {
    count as f64 / (page.height / page.viewport_height).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn el(tag: &str, rect: Rect) -> TrackedElement {
        TrackedElement {
            node: NodeId(0),
            tag: tag.to_string(),
            rect,
            dwell_score: 0.0,
            priority_weight: 1.0,
            visible: true,
            style: None,
        }
    }

    #[test]
    fn test_nested_boxes_are_counted_once() {
        let elements = vec![
            el("SPAN", Rect::new(10.0, 10.0, 50.0, 10.0)),
            el("ARTICLE", Rect::new(0.0, 0.0, 200.0, 100.0)),
            el("P", Rect::new(150.0, 0.0, 100.0, 20.0)),
        ];
        let counted = counted_rects(&elements);
        assert_eq!(counted.len(), 2);
        assert_eq!(counted[0].area(), 20000.0);
    }

    #[test]
    fn test_density_and_consistency() {
        let page = PageGeometry::new(1000.0, 2000.0, 1000.0);
        // 25% of the first screen, 25% of the second
        let counted = vec![
            Rect::new(0.0, 0.0, 1000.0, 250.0),
            Rect::new(1000.0, 0.0, 1000.0, 250.0),
        ];
        let m = measure_density(&counted, &page);
        assert_eq!(m.overall, 25.0);
        assert_eq!(m.above_fold, 25.0);
        assert_eq!(m.consistency, 100.0);
        assert!((m.composite - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_uneven_distribution_lowers_consistency() {
        let page = PageGeometry::new(1000.0, 2000.0, 1000.0);
        let counted = vec![Rect::new(0.0, 0.0, 1000.0, 500.0)];
        let m = measure_density(&counted, &page);
        // slices 50% and 0% → cv = 1
        assert_eq!(m.consistency, 0.0);
        assert_eq!(m.above_fold, 50.0);
    }

    #[test]
    fn test_block_gaps() {
        let elements = vec![
            el("P", Rect::new(0.0, 0.0, 100.0, 20.0)),
            el("H2", Rect::new(52.0, 0.0, 100.0, 20.0)),
            el("P", Rect::new(60.0, 0.0, 100.0, 20.0)),
            el("SPAN", Rect::new(500.0, 0.0, 100.0, 20.0)),
            el("LI", Rect::new(96.0, 0.0, 100.0, 20.0)),
        ];
        // gaps: 32, -12 (skipped), 16
        assert_eq!(average_block_gap(&elements), 24.0);
        assert_eq!(white_space_ratio(24.0), 50.0);
        assert_eq!(white_space_ratio(96.0), 100.0);
    }

    #[test]
    fn test_elements_per_screen_short_page() {
        let page = PageGeometry::new(1000.0, 500.0, 800.0);
        assert_eq!(elements_per_screen(12, &page), 12.0);
        let tall = PageGeometry::new(1000.0, 4000.0, 800.0);
        assert_eq!(elements_per_screen(50, &tall), 10.0);
    }
}

//! Element catalog
//!
//! Scans the document for trackable content and interactive nodes and keeps one
//! record per node across rescans. Records are keyed by node identity so dwell
//! history survives re-queries; nodes that stop matching are dropped.

use crate::config::{HeatGridConfig, TRACKED_TAGS};
use crate::error::HeatGridError;
use crate::host::PageHost;
use crate::types::{ComputedStyle, ElementSnapshot, NodeId, PageMetrics, Rect};
use log::debug;
use std::collections::HashMap;

/// Boxes smaller than this in either dimension are ignored
const MIN_BOX_SIZE_PX: f64 = 10.0;

/// Minimum trimmed text length for textual nodes
const MIN_TEXT_CHARS: usize = 6;

/// Minimum whitespace-free text length for textual nodes
const MIN_VISIBLE_CHARS: usize = 4;

const INTERACTIVE_TAGS: &[&str] = &["A", "BUTTON", "INPUT", "SELECT", "TEXTAREA", "SUMMARY"];

/// Interactive controls that carry a value even without text
const VALUE_CONTROL_TAGS: &[&str] = &["INPUT", "SELECT"];

/// A tracked node and its accumulated attention
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedElement {
    pub node: NodeId,
    /// Uppercase tag name
    pub tag: String,
    /// Document-relative box
    pub rect: Rect,
    /// Cumulative attention, in `[0, max_dwell_score]`
    pub dwell_score: f64,
    pub priority_weight: f64,
    pub visible: bool,
    pub style: Option<ComputedStyle>,
}

/// Counts from one rescan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RescanStats {
    pub kept: usize,
    pub added: usize,
    pub dropped: usize,
    pub skipped: usize,
}

/// Catalog of tracked elements in document order
#[derive(Debug, Clone, Default)]
pub struct ElementCatalog {
    elements: Vec<TrackedElement>,
}

impl ElementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[TrackedElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [TrackedElement] {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&TrackedElement> {
        self.elements.iter().find(|e| e.node == node)
    }

    /// Drop every record, including dwell history
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Re-query the document and rebuild the catalog.
    ///
    /// Matching nodes keep their dwell score and visibility; only geometry,
    /// priority and style are refreshed. Unreadable candidates are skipped.
    pub fn rescan<H: PageHost + ?Sized>(
        &mut self,
        host: &H,
        config: &HeatGridConfig,
    ) -> Result<RescanStats, HeatGridError> {
        let metrics = host.metrics()?;
        let mut previous: HashMap<NodeId, TrackedElement> =
            self.elements.drain(..).map(|e| (e.node, e)).collect();
        let previous_count = previous.len();

        let mut stats = RescanStats::default();
        let mut next = Vec::new();

        for candidate in host.query_elements(TRACKED_TAGS) {
            let snapshot = match candidate {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!("skipping unreadable element: {}", e);
                    stats.skipped += 1;
                    continue;
                }
            };

            let Some(rect) = accept(&snapshot, &metrics) else {
                continue;
            };
            let tag = snapshot.tag.to_ascii_uppercase();
            let priority_weight = config.priority_weight(&tag);

            match previous.remove(&snapshot.node) {
                Some(mut existing) => {
                    existing.rect = rect;
                    existing.priority_weight = priority_weight;
                    existing.tag = tag;
                    existing.style = snapshot.style;
                    stats.kept += 1;
                    next.push(existing);
                }
                None => {
                    stats.added += 1;
                    next.push(TrackedElement {
                        node: snapshot.node,
                        tag,
                        rect,
                        dwell_score: 0.0,
                        priority_weight,
                        visible: false,
                        style: snapshot.style,
                    });
                }
            }
        }

        stats.dropped = previous_count - stats.kept;
        self.elements = next;
        debug!(
            "rescan: {} tracked ({} kept, {} new, {} dropped, {} unreadable)",
            self.elements.len(),
            stats.kept,
            stats.added,
            stats.dropped,
            stats.skipped
        );
        Ok(stats)
    }

    /// Recompute visibility against the current viewport
    pub fn update_visibility(&mut self, metrics: &PageMetrics) {
        let viewport_top = metrics.scroll_y;
        let viewport_bottom = viewport_top + metrics.viewport_height;
        for element in &mut self.elements {
            element.visible =
                element.rect.bottom() > viewport_top && element.rect.top < viewport_bottom;
        }
    }
}

/// Apply the size and text heuristics; returns the document-relative box on success
fn accept(snapshot: &ElementSnapshot, metrics: &PageMetrics) -> Option<Rect> {
    let client_rect = snapshot.rect?;
    if client_rect.width < MIN_BOX_SIZE_PX || client_rect.height < MIN_BOX_SIZE_PX {
        return None;
    }

    let tag = snapshot.tag.to_ascii_uppercase();
    let text = snapshot.text.trim();
    let is_interactive = INTERACTIVE_TAGS.contains(&tag.as_str());

    if is_interactive {
        if text.is_empty() && !VALUE_CONTROL_TAGS.contains(&tag.as_str()) {
            return None;
        }
    } else {
        let visible_chars = text.chars().filter(|c| !c.is_whitespace()).count();
        if text.chars().count() < MIN_TEXT_CHARS || visible_chars < MIN_VISIBLE_CHARS {
            return None;
        }
    }

    Some(client_rect.translate(metrics.scroll_x, metrics.scroll_y))
}

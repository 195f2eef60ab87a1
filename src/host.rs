//! Host seams
//!
//! The engine never touches a real document. It reads the page through
//! [`PageHost`] and pushes pixels and panel state out through [`Surface`].
//! [`StaticPage`] and [`RecordingSurface`] are in-memory implementations used by
//! the FFI layer, the CLI replay and the tests.

use crate::error::HeatGridError;
use crate::panel::PanelView;
use crate::render::OverlayFrame;
use crate::types::{ElementSnapshot, PageMetrics, ThemeSample};
use serde::{Deserialize, Serialize};

/// Read-only view of the host document
pub trait PageHost {
    /// Current document/viewport dimensions and scroll offset
    fn metrics(&self) -> Result<PageMetrics, HeatGridError>;

    /// Candidate nodes for the given tag names, in document order.
    ///
    /// Each entry is read independently; a node that disappears or whose
    /// style cannot be computed yields an `Err` for that entry only.
    fn query_elements(&self, tags: &[&str]) -> Vec<Result<ElementSnapshot, HeatGridError>>;

    /// Background colours for theme detection
    fn theme_sample(&self) -> Result<ThemeSample, HeatGridError>;
}

/// Output side: heat overlay and pinned summary panel
pub trait Surface {
    /// Draw a frame onto the overlay, creating it if needed
    fn present(&mut self, frame: &OverlayFrame);

    /// Remove the overlay from the page
    fn remove_overlay(&mut self);

    /// Mount or refresh the pinned panel
    fn show_panel(&mut self, view: &PanelView);

    /// Unmount the pinned panel
    fn remove_panel(&mut self);
}

/// A page described entirely by data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPage {
    pub metrics: PageMetrics,
    #[serde(default)]
    pub elements: Vec<ElementSnapshot>,
    #[serde(default)]
    pub theme: ThemeSample,
}

impl StaticPage {
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            elements: Vec::new(),
            theme: ThemeSample::default(),
        }
    }

    /// Parse a page description from JSON
    pub fn from_json(json: &str) -> Result<Self, HeatGridError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PageHost for StaticPage {
    fn metrics(&self) -> Result<PageMetrics, HeatGridError> {
        Ok(self.metrics)
    }

    fn query_elements(&self, tags: &[&str]) -> Vec<Result<ElementSnapshot, HeatGridError>> {
        self.elements
            .iter()
            .filter(|el| tags.iter().any(|t| t.eq_ignore_ascii_case(&el.tag)))
            .cloned()
            .map(Ok)
            .collect()
    }

    fn theme_sample(&self) -> Result<ThemeSample, HeatGridError> {
        Ok(self.theme.clone())
    }
}

/// Surface that keeps whatever was last pushed to it
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub last_frame: Option<OverlayFrame>,
    pub frames_presented: u64,
    pub overlay_attached: bool,
    pub panel: Option<PanelView>,
}

impl Surface for RecordingSurface {
    fn present(&mut self, frame: &OverlayFrame) {
        self.last_frame = Some(frame.clone());
        self.frames_presented += 1;
        self.overlay_attached = true;
    }

    fn remove_overlay(&mut self) {
        self.overlay_attached = false;
        self.last_frame = None;
    }

    fn show_panel(&mut self, view: &PanelView) {
        self.panel = Some(view.clone());
    }

    fn remove_panel(&mut self) {
        self.panel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Rect};

    #[test]
    fn test_static_page_filters_by_tag() {
        let mut page = StaticPage::new(PageMetrics::new(1000.0, 2000.0, 1000.0, 800.0));
        page.elements.push(ElementSnapshot {
            node: NodeId(1),
            tag: "p".to_string(),
            rect: Some(Rect::new(0.0, 0.0, 100.0, 20.0)),
            text: "Some paragraph".to_string(),
            style: None,
        });
        page.elements.push(ElementSnapshot {
            node: NodeId(2),
            tag: "div".to_string(),
            rect: Some(Rect::new(0.0, 0.0, 100.0, 20.0)),
            text: "Container".to_string(),
            style: None,
        });

        let found = page.query_elements(&["P", "SPAN"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].as_ref().unwrap().node, NodeId(1));
    }
}

//! Page geometry and element snapshot types
//!
//! These are the shapes the host page hands to the engine. Rectangles coming
//! from the host are viewport-relative (like a bounding client rect); the
//! catalog converts them to document coordinates.

use serde::{Deserialize, Serialize};

/// Stable identity of a live DOM node, guaranteed unique by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Inclusive point test
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shift by a scroll offset
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            top: self.top + dy,
            left: self.left + dx,
            ..*self
        }
    }
}

/// Document and viewport dimensions plus the current scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    /// Full scrollable document width
    pub document_width: f64,
    /// Full scrollable document height
    pub document_height: f64,
    /// Viewport width
    pub viewport_width: f64,
    /// Viewport height
    pub viewport_height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl PageMetrics {
    pub fn new(document_width: f64, document_height: f64, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            document_width,
            document_height,
            viewport_width,
            viewport_height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// Computed style strings as reported by the host (e.g. `"16px"`, `"rgb(0, 0, 0)"`)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    #[serde(default)]
    pub font_size: String,
    #[serde(default)]
    pub line_height: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub background_color: String,
}

/// One candidate node as read from the document during a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Node identity
    pub node: NodeId,
    /// Tag name (any case)
    pub tag: String,
    /// Viewport-relative bounding box; `None` when the node has no rendered box
    pub rect: Option<Rect>,
    /// Rendered text content
    #[serde(default)]
    pub text: String,
    /// Computed style; `None` when style computation failed
    #[serde(default)]
    pub style: Option<ComputedStyle>,
}

/// Background colours gathered for theme detection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSample {
    /// Computed background of `<body>`
    pub body_background: Option<String>,
    /// Computed background of the root element
    pub root_background: Option<String>,
    /// For each sample point, backgrounds from the hit element up to the root
    #[serde(default)]
    pub sample_chains: Vec<Vec<String>>,
}

/// Parse the leading numeric part of a CSS length (`"16px"` → 16.0, `"normal"` → None)
pub fn parse_css_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_containment() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
        assert!(outer.contains_point(100.0, 100.0));
        assert!(!outer.contains_point(100.5, 50.0));
    }

    #[test]
    fn test_parse_css_px() {
        assert_eq!(parse_css_px("16px"), Some(16.0));
        assert_eq!(parse_css_px(" 13.5px"), Some(13.5));
        assert_eq!(parse_css_px("normal"), None);
        assert_eq!(parse_css_px(""), None);
    }

    #[test]
    fn test_element_snapshot_deserialization() {
        let json = r#"{
            "node": 42,
            "tag": "p",
            "rect": { "top": 10.0, "left": 20.0, "width": 300.0, "height": 40.0 },
            "text": "Hello there world"
        }"#;
        let snapshot: ElementSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.node, NodeId(42));
        assert!(snapshot.style.is_none());
        assert_eq!(snapshot.rect.unwrap().right(), 320.0);
    }
}

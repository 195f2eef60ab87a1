//! Pinned summary panel
//!
//! The panel itself is host markup; this module decides what it shows. It is
//! rebuilt from an analytics snapshot on pin and on every refresh tick.

use crate::analytics::{AnalyticsSnapshot, MIN_ACTIVE_SECONDS};
use crate::ux::UxLabel;
use serde::{Deserialize, Serialize};

/// Colour treatment for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Tone {
    pub fn for_score(score: u32) -> Self {
        match score {
            85.. => Tone::Excellent,
            70..=84 => Tone::Good,
            40..=69 => Tone::Fair,
            _ => Tone::Poor,
        }
    }
}

/// Headline area of the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelState {
    /// Enough data: show the score
    Result { score: u32, label: UxLabel, tone: Tone },
    /// Collecting: seconds until results can be shown
    Countdown { seconds_left: u64 },
    /// Nothing collected yet
    Waiting,
}

/// Metric tiles, already formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelMetrics {
    pub density: String,
    pub spacing: String,
    pub complexity: String,
    pub readability: String,
}

/// Everything the panel renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub state: PanelState,
    /// `None` until tracking has produced active time
    pub metrics: Option<PanelMetrics>,
    pub is_tracking: bool,
    pub is_visible: bool,
}

impl PanelView {
    pub fn from_snapshot(snapshot: &AnalyticsSnapshot, is_visible: bool) -> Self {
        let ux = &snapshot.ux_evaluation;
        let state = if snapshot.has_data {
            PanelState::Result {
                score: ux.score,
                label: ux.label,
                tone: Tone::for_score(ux.score),
            }
        } else if snapshot.active_time_sec > 0 && snapshot.active_time_sec <= MIN_ACTIVE_SECONDS {
            PanelState::Countdown {
                seconds_left: MIN_ACTIVE_SECONDS - snapshot.active_time_sec,
            }
        } else {
            PanelState::Waiting
        };

        let metrics = (snapshot.has_data || snapshot.active_time_sec > 0).then(|| PanelMetrics {
            density: format!("{}%", ux.text_density),
            spacing: format!("{}%", ux.white_space_ratio),
            complexity: format!("{}", ux.elements_per_screen),
            readability: format!("{}%", ux.readability),
        });

        Self {
            state,
            metrics,
            is_tracking: snapshot.is_tracking,
            is_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ux::{self, PageGeometry};

    fn snapshot(active: u64, has_data: bool) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            active_time: format!("{}s", active),
            active_time_sec: active,
            is_tracking: true,
            has_data,
            ux_evaluation: ux::evaluate(&[], &PageGeometry::new(1000.0, 1000.0, 1000.0)),
        }
    }

    #[test]
    fn test_waiting_before_activity() {
        let view = PanelView::from_snapshot(&snapshot(0, false), false);
        assert_eq!(view.state, PanelState::Waiting);
        assert!(view.metrics.is_none());
    }

    #[test]
    fn test_countdown_while_collecting() {
        let view = PanelView::from_snapshot(&snapshot(4, false), true);
        assert_eq!(view.state, PanelState::Countdown { seconds_left: 6 });
        let metrics = view.metrics.unwrap();
        assert_eq!(metrics.density, "0%");
        assert_eq!(metrics.complexity, "0");
    }

    #[test]
    fn test_long_session_without_enough_dwell_waits() {
        let view = PanelView::from_snapshot(&snapshot(45, false), false);
        assert_eq!(view.state, PanelState::Waiting);
        assert!(view.metrics.is_some());
    }

    #[test]
    fn test_result_tone() {
        let view = PanelView::from_snapshot(&snapshot(30, true), false);
        assert_eq!(
            view.state,
            PanelState::Result {
                score: 30,
                label: UxLabel::Fatiguing,
                tone: Tone::Poor
            }
        );
        assert_eq!(Tone::for_score(55), Tone::Fair);
        assert_eq!(Tone::for_score(70), Tone::Good);
    }
}

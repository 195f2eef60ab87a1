//! Attention accumulator
//!
//! Pointer and scroll state plus the per-tick dwell accrual over visible
//! elements. Dwell scores only grow (up to the cap); nothing here decays them.

use crate::catalog::TrackedElement;
use crate::config::HeatGridConfig;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Number of scroll velocity samples retained
pub const SCROLL_WINDOW: usize = 10;

/// Off-page sentinel used before the first pointer event
const POINTER_OFFSCREEN: f64 = -1000.0;

/// Last known pointer position (document coordinates)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
    pub last_move: Option<DateTime<Utc>>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            x: POINTER_OFFSCREEN,
            y: POINTER_OFFSCREEN,
            last_move: None,
        }
    }
}

impl PointerState {
    pub fn move_to(&mut self, x: f64, y: f64, now: DateTime<Utc>) {
        self.x = x;
        self.y = y;
        self.last_move = Some(now);
    }

    /// Whether the pointer moved strictly less than `window_ms` before `now`
    pub fn moved_within(&self, now: DateTime<Utc>, window_ms: i64) -> bool {
        self.last_move
            .map(|t| (now - t).num_milliseconds() < window_ms)
            .unwrap_or(false)
    }
}

/// Scroll velocity samples
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    last_y: Option<f64>,
    last_at: Option<DateTime<Utc>>,
    samples: VecDeque<f64>,
}

impl ScrollTracker {
    /// Record a scroll position; returns the velocity sample in px/s, if any
    pub fn record(&mut self, scroll_y: f64, now: DateTime<Utc>) -> Option<f64> {
        let mut sample = None;
        if let (Some(last_y), Some(last_at)) = (self.last_y, self.last_at) {
            let dt_ms = (now - last_at).num_milliseconds();
            if dt_ms > 0 {
                let velocity = (scroll_y - last_y).abs() / dt_ms as f64 * 1000.0;
                self.samples.push_back(velocity);
                if self.samples.len() > SCROLL_WINDOW {
                    self.samples.pop_front();
                }
                sample = Some(velocity);
            }
        }
        self.last_y = Some(scroll_y);
        self.last_at = Some(now);
        sample
    }

    /// Latest velocity sample; holds until the next scroll event
    pub fn latest_speed(&self) -> f64 {
        self.samples.back().copied().unwrap_or(0.0)
    }

    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

/// Dwell multiplier damping from scroll speed, in `[0.1, 1.0]`
pub fn scroll_factor(speed: f64, suppression_speed: f64) -> f64 {
    (1.0 - speed / suppression_speed).clamp(0.1, 1.0)
}

/// Accrue one tick of dwell over all visible elements
pub fn accrue_dwell(
    elements: &mut [TrackedElement],
    pointer: &PointerState,
    scroll_speed: f64,
    now: DateTime<Utc>,
    config: &HeatGridConfig,
) {
    let factor = scroll_factor(scroll_speed, config.scroll_suppression_speed);
    let pointer_active = pointer.moved_within(now, config.pointer_dwell_window_ms);

    for element in elements.iter_mut().filter(|e| e.visible) {
        let base = config.dwell_increment * element.priority_weight;
        let focus = if pointer_active && element.rect.contains_point(pointer.x, pointer.y) {
            2.0
        } else {
            0.3
        };
        element.dwell_score = (element.dwell_score + base * focus * factor).min(config.max_dwell_score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Rect};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
    }

    fn button() -> TrackedElement {
        TrackedElement {
            node: NodeId(1),
            tag: "BUTTON".to_string(),
            rect: Rect::new(100.0, 100.0, 120.0, 40.0),
            dwell_score: 0.0,
            priority_weight: 2.0,
            visible: true,
            style: None,
        }
    }

    #[test]
    fn test_pointer_focus_accrual_and_cap() {
        let config = HeatGridConfig::default();
        let mut elements = vec![button()];
        let mut pointer = PointerState::default();
        pointer.move_to(150.0, 120.0, t0());

        accrue_dwell(&mut elements, &pointer, 0.0, t0() + Duration::milliseconds(500), &config);
        assert!((elements[0].dwell_score - 3.2).abs() < 1e-9);

        accrue_dwell(&mut elements, &pointer, 0.0, t0() + Duration::milliseconds(1000), &config);
        assert_eq!(elements[0].dwell_score, 5.0);
    }

    #[test]
    fn test_stale_pointer_uses_ambient_rate() {
        let config = HeatGridConfig::default();
        let mut elements = vec![button()];
        let mut pointer = PointerState::default();
        pointer.move_to(150.0, 120.0, t0());

        accrue_dwell(&mut elements, &pointer, 0.0, t0() + Duration::milliseconds(3000), &config);
        assert!((elements[0].dwell_score - 0.48).abs() < 1e-9);
    }

    #[test]
    fn test_hidden_elements_are_sticky() {
        let config = HeatGridConfig::default();
        let mut element = button();
        element.visible = false;
        element.dwell_score = 2.0;
        let mut elements = vec![element];

        accrue_dwell(&mut elements, &PointerState::default(), 0.0, t0(), &config);
        assert_eq!(elements[0].dwell_score, 2.0);
    }

    #[test]
    fn test_scroll_velocity_window() {
        let mut tracker = ScrollTracker::default();
        assert_eq!(tracker.record(0.0, t0()), None);
        assert_eq!(tracker.record(300.0, t0() + Duration::milliseconds(100)), Some(3000.0));
        assert_eq!(tracker.latest_speed(), 3000.0);
        // a slow follow-up replaces the fast sample
        tracker.record(310.0, t0() + Duration::milliseconds(1100));
        assert_eq!(tracker.latest_speed(), 10.0);

        for i in 12..30 {
            tracker.record(300.0 + i as f64 * 10.0, t0() + Duration::milliseconds(100 * i));
        }
        assert_eq!(tracker.samples().count(), SCROLL_WINDOW);
    }

    #[test]
    fn test_scroll_factor_bounds() {
        assert_eq!(scroll_factor(0.0, 1500.0), 1.0);
        assert_eq!(scroll_factor(750.0, 1500.0), 0.5);
        assert_eq!(scroll_factor(6000.0, 1500.0), 0.1);
    }
}

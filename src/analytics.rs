//! Active time and the cached UX evaluation
//!
//! Active time is a presence gate: it only grows on activity ticks that find a
//! recent interaction, and it never decays. The evaluation cache opens once
//! enough attention has been collected and then holds its value until a layout
//! change marks it dirty.

use crate::catalog::TrackedElement;
use crate::config::HeatGridConfig;
use crate::ux::{self, PageGeometry, UxEvaluation};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Dwell above which an element counts as viewed
pub const VIEWED_DWELL: f64 = 1.0;

/// Viewed elements needed before results are trusted
pub const MIN_VIEWED_ELEMENTS: usize = 2;

/// Active seconds needed before results are trusted
pub const MIN_ACTIVE_SECONDS: u64 = 10;

/// Accumulated active time
#[derive(Debug, Clone, Default)]
pub struct ActivityClock {
    active_ms: i64,
    last_interaction: Option<DateTime<Utc>>,
}

impl ActivityClock {
    pub fn register_interaction(&mut self, now: DateTime<Utc>) {
        self.last_interaction = Some(now);
    }

    /// One activity tick: accrue if the last interaction is younger than the idle cutoff
    pub fn tick(&mut self, now: DateTime<Utc>, config: &HeatGridConfig) -> bool {
        let present = self
            .last_interaction
            .map(|t| (now - t).num_milliseconds() < config.idle_cutoff_ms)
            .unwrap_or(false);
        if present {
            self.active_ms += config.activity_interval_ms;
        }
        present
    }

    pub fn active_ms(&self) -> i64 {
        self.active_ms
    }

    pub fn active_seconds(&self) -> u64 {
        (self.active_ms / 1000).max(0) as u64
    }

    pub fn last_interaction(&self) -> Option<DateTime<Utc>> {
        self.last_interaction
    }

    /// Zero the clock; `now` counts as the last interaction
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.active_ms = 0;
        self.last_interaction = Some(now);
    }
}

/// `"42s"` or `"3m 7s"`
pub fn format_active_time(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}

/// Whether enough attention has been collected for a stable result
pub fn has_data(elements: &[TrackedElement], active_seconds: u64) -> bool {
    let viewed = elements
        .iter()
        .filter(|e| e.dwell_score > VIEWED_DWELL)
        .count();
    viewed >= MIN_VIEWED_ELEMENTS && active_seconds >= MIN_ACTIVE_SECONDS
}

/// Memoized evaluation with a dirty flag
#[derive(Debug, Clone)]
pub struct AnalyticsCache {
    cached: Option<UxEvaluation>,
    dirty: bool,
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self {
            cached: None,
            dirty: true,
        }
    }
}

impl AnalyticsCache {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cached(&self) -> Option<&UxEvaluation> {
        self.cached.as_ref()
    }

    /// Drop the cached evaluation
    pub fn discard(&mut self) {
        self.cached = None;
        self.dirty = true;
    }

    /// Evaluation for a request.
    ///
    /// With the gate closed this is always a fresh, uncached evaluation. With
    /// it open, the cached value is reused unless dirty or absent.
    pub fn resolve(
        &mut self,
        gate_open: bool,
        elements: &[TrackedElement],
        page: &PageGeometry,
    ) -> UxEvaluation {
        if !gate_open {
            return ux::evaluate(elements, page);
        }
        match &self.cached {
            Some(evaluation) if !self.dirty => evaluation.clone(),
            _ => {
                let evaluation = ux::evaluate(elements, page);
                debug!(
                    "UX evaluation recomputed: score {} ({})",
                    evaluation.score,
                    evaluation.label.as_str()
                );
                self.cached = Some(evaluation.clone());
                self.dirty = false;
                evaluation
            }
        }
    }
}

/// Response to `getAnalytics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub active_time: String,
    pub active_time_sec: u64,
    pub is_tracking: bool,
    pub has_data: bool,
    pub ux_evaluation: UxEvaluation,
}

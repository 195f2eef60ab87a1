//! Host-driven timers
//!
//! Nothing here sleeps or spawns. Each timer records when it is next due and the
//! session fires it from `advance` once the host clock has passed that point.

use chrono::{DateTime, Duration, Utc};

/// Fixed-period repeating timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl IntervalTimer {
    pub fn new(period_ms: i64) -> Self {
        Self {
            period: Duration::milliseconds(period_ms),
            next_due: None,
        }
    }

    /// Arm the timer; the first firing is one period after `now`
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// If due at or before `now`, consume one firing and return its scheduled time
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let due = self.next_due.filter(|due| *due <= now)?;
        self.next_due = Some(due + self.period);
        Some(due)
    }
}

/// Trailing debounce: fires once, a full window after the last trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window: Duration::milliseconds(window_ms),
            deadline: None,
        }
    }

    /// Schedule, replacing any pending deadline
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// If the window has elapsed, clear it and return the deadline
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let deadline = self.deadline.filter(|d| *d <= now)?;
        self.deadline = None;
        Some(deadline)
    }
}

/// Self-terminating per-frame loop
///
/// Each frame checks the run flag first; once stopped the loop stays stopped
/// until `start` is called again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderLoop {
    running: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Top of a frame: returns whether to draw. A loop whose condition no longer
    /// holds stops itself.
    pub fn begin_frame(&mut self, still_wanted: bool) -> bool {
        if !self.running {
            return false;
        }
        if !still_wanted {
            self.running = false;
            return false;
        }
        self.frames += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_interval_catches_up_in_order() {
        let mut timer = IntervalTimer::new(500);
        assert_eq!(timer.fire_due(t0() + Duration::seconds(5)), None);

        timer.start(t0());
        let now = t0() + Duration::milliseconds(1600);
        let mut fired = Vec::new();
        while let Some(at) = timer.fire_due(now) {
            fired.push((at - t0()).num_milliseconds());
        }
        assert_eq!(fired, vec![500, 1000, 1500]);
        assert_eq!(timer.next_due(), Some(t0() + Duration::milliseconds(2000)));

        timer.cancel();
        assert_eq!(timer.fire_due(t0() + Duration::seconds(10)), None);
    }

    #[test]
    fn test_debounce_coalesces_and_resets() {
        let mut debounce = Debouncer::new(2000);
        debounce.trigger(t0());
        debounce.trigger(t0() + Duration::milliseconds(1500));

        assert_eq!(debounce.fire_due(t0() + Duration::milliseconds(2500)), None);
        assert_eq!(
            debounce.fire_due(t0() + Duration::milliseconds(3500)),
            Some(t0() + Duration::milliseconds(3500))
        );
        assert!(!debounce.is_pending());
        assert_eq!(debounce.fire_due(t0() + Duration::seconds(60)), None);
    }

    #[test]
    fn test_render_loop_stops_itself() {
        let mut frames = RenderLoop::default();
        assert!(!frames.begin_frame(true));

        frames.start();
        assert!(frames.begin_frame(true));
        assert!(frames.begin_frame(true));
        assert!(!frames.begin_frame(false));
        assert!(!frames.is_running());
        // no implicit restart
        assert!(!frames.begin_frame(true));
        assert_eq!(frames.frames(), 2);
    }
}

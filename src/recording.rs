//! Recorded sessions and the in-memory driver
//!
//! A [`Recording`] is a page snapshot plus a list of timed steps, each either a
//! command or a host event. [`SessionDriver`] owns a session together with a
//! [`StaticPage`] and a [`RecordingSurface`], applies host events to the page
//! before forwarding them, and advances the clock before every step.

use crate::command::{Command, HostEvent, Response};
use crate::config::HeatGridConfig;
use crate::error::HeatGridError;
use crate::host::{RecordingSurface, StaticPage};
use crate::session::{AdvanceSummary, Session};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// One timed input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Milliseconds since the start of the recording
    pub at_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<HostEvent>,
}

/// Page snapshot plus the inputs observed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub page: StaticPage,
    #[serde(default)]
    pub config: Option<HeatGridConfig>,
    /// Wall-clock origin; defaults to the time of replay
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    pub steps: Vec<Step>,
    /// Keep the clock running until this offset after the last step
    #[serde(default)]
    pub end_ms: Option<i64>,
}

impl Recording {
    pub fn from_json(json: &str) -> Result<Self, HeatGridError> {
        let recording: Recording = serde_json::from_str(json)?;
        recording.validate()?;
        Ok(recording)
    }

    /// Steps must be in time order and carry exactly one input each
    pub fn validate(&self) -> Result<(), HeatGridError> {
        let mut previous = 0;
        for (i, step) in self.steps.iter().enumerate() {
            if step.at_ms < previous {
                return Err(HeatGridError::InvalidRecording(format!(
                    "step {} at {}ms is earlier than the previous step ({}ms)",
                    i, step.at_ms, previous
                )));
            }
            if step.command.is_some() == step.event.is_some() {
                return Err(HeatGridError::InvalidRecording(format!(
                    "step {} must carry exactly one of command or event",
                    i
                )));
            }
            previous = step.at_ms;
        }
        if let Some(end) = self.end_ms {
            if end < previous {
                return Err(HeatGridError::InvalidRecording(format!(
                    "endMs {} precedes the last step ({}ms)",
                    end, previous
                )));
            }
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }
        Ok(())
    }
}

/// Session bound to an in-memory page and surface
#[derive(Debug)]
pub struct SessionDriver {
    pub session: Session,
    pub page: StaticPage,
    pub surface: RecordingSurface,
}

impl SessionDriver {
    pub fn new(config: HeatGridConfig, page: StaticPage) -> Result<Self, HeatGridError> {
        Ok(Self {
            session: Session::new(config)?,
            page,
            surface: RecordingSurface::default(),
        })
    }

    /// Fire every timer due by `now`
    pub fn advance(&mut self, now: DateTime<Utc>) -> AdvanceSummary {
        self.session.advance(now, &self.page, &mut self.surface)
    }

    pub fn command(&mut self, command: Command, now: DateTime<Utc>) -> Response {
        self.advance(now);
        self.session
            .handle(command, now, &self.page, &mut self.surface)
    }

    /// Apply an event to the page, then notify the session
    pub fn event(&mut self, event: HostEvent, now: DateTime<Utc>) -> Result<(), HeatGridError> {
        self.advance(now);
        match event {
            HostEvent::PointerMove { x, y } => self.session.on_pointer_move(x, y, now),
            HostEvent::Click { x, y } => self.session.on_click(x, y, now),
            HostEvent::Scroll { scroll_x, scroll_y } => {
                self.page.metrics.scroll_x = scroll_x;
                self.page.metrics.scroll_y = scroll_y;
                self.session.on_scroll(now, &self.page)?;
            }
            HostEvent::Resize {
                document_width,
                document_height,
                viewport_width,
                viewport_height,
            } => {
                let metrics = &mut self.page.metrics;
                metrics.document_width = document_width;
                metrics.document_height = document_height;
                metrics.viewport_width = viewport_width;
                metrics.viewport_height = viewport_height;
                self.session.on_resize(&self.page)?;
            }
            HostEvent::Mutation { elements } => {
                if let Some(elements) = elements {
                    self.page.elements = elements;
                }
                self.session.on_mutation(now);
            }
            HostEvent::Frame => {
                self.session.on_frame(&mut self.surface);
            }
            HostEvent::Advance => {}
        }
        Ok(())
    }
}

/// Result of replaying a recording
#[derive(Debug)]
pub struct ReplayOutcome {
    pub driver: SessionDriver,
    pub responses: Vec<Response>,
    pub ended_at: DateTime<Utc>,
}

/// Run every step of a recording against a fresh session
pub fn replay(recording: &Recording) -> Result<ReplayOutcome, HeatGridError> {
    recording.validate()?;
    let origin = recording.started_at.unwrap_or_else(Utc::now);
    let config = recording.config.clone().unwrap_or_default();
    let mut driver = SessionDriver::new(config, recording.page.clone())?;
    let mut responses = Vec::new();
    let mut ended_at = origin;

    for step in &recording.steps {
        let now = origin + Duration::milliseconds(step.at_ms);
        if let Some(command) = step.command {
            let response = driver.command(command, now);
            debug!("{}ms {} -> success={}", step.at_ms, command.action(), response.is_success());
            responses.push(response);
        } else if let Some(event) = &step.event {
            driver.event(event.clone(), now)?;
        }
        ended_at = now;
    }

    if let Some(end) = recording.end_ms {
        ended_at = origin + Duration::milliseconds(end);
        driver.advance(ended_at);
    }

    info!(
        "replayed {} steps over {}ms",
        recording.steps.len(),
        (ended_at - origin).num_milliseconds()
    );
    Ok(ReplayOutcome {
        driver,
        responses,
        ended_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TrackingState;

    const RECORDING: &str = r#"{
        "page": {
            "metrics": {
                "documentWidth": 1200, "documentHeight": 3000,
                "viewportWidth": 1200, "viewportHeight": 800
            },
            "elements": [
                {"node": 1, "tag": "h1", "rect": {"top": 40, "left": 100, "width": 800, "height": 60},
                 "text": "Release notes"},
                {"node": 2, "tag": "button", "rect": {"top": 150, "left": 100, "width": 160, "height": 40},
                 "text": "Upgrade"},
                {"node": 3, "tag": "p", "rect": {"top": 1200, "left": 100, "width": 900, "height": 120},
                 "text": "Below the fold paragraph."}
            ],
            "theme": {"bodyBackground": "rgb(18, 18, 18)"}
        },
        "startedAt": "2026-03-02T15:00:00Z",
        "steps": [
            {"atMs": 0, "command": {"action": "startTracking"}},
            {"atMs": 100, "event": {"type": "pointerMove", "x": 150, "y": 170}},
            {"atMs": 200, "event": {"type": "click", "x": 150, "y": 170}},
            {"atMs": 1200, "event": {"type": "scroll", "scrollY": 900}},
            {"atMs": 1300, "command": {"action": "showHeatmap"}},
            {"atMs": 1400, "event": {"type": "frame"}}
        ],
        "endMs": 2000
    }"#;

    #[test]
    fn test_replay_runs_steps_in_order() {
        let recording = Recording::from_json(RECORDING).unwrap();
        let outcome = replay(&recording).unwrap();
        let driver = &outcome.driver;

        assert_eq!(outcome.responses.len(), 2);
        assert!(outcome.responses.iter().all(Response::is_success));
        assert_eq!(driver.session.state(), TrackingState::Tracking);
        assert_eq!(driver.page.metrics.scroll_y, 900.0);
        assert!(driver.surface.overlay_attached);
        assert_eq!(driver.surface.frames_presented, 2);
        assert_eq!(
            outcome.ended_at,
            "2026-03-02T15:00:02Z".parse::<DateTime<Utc>>().unwrap()
        );

        // Scrolled into view: paragraph is visible, heading is not
        let catalog = driver.session.catalog();
        assert!(catalog.elements().iter().any(|e| e.tag == "P" && e.visible));
        assert!(catalog.elements().iter().any(|e| e.tag == "H1" && !e.visible));
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let json = r#"{
            "page": {"metrics": {"documentWidth": 100, "documentHeight": 100,
                                 "viewportWidth": 100, "viewportHeight": 100}},
            "steps": [
                {"atMs": 500, "command": {"action": "start"}},
                {"atMs": 100, "command": {"action": "stop"}}
            ]
        }"#;
        let err = Recording::from_json(json).unwrap_err();
        assert!(matches!(err, HeatGridError::InvalidRecording(_)));
    }

    #[test]
    fn test_step_needs_one_input() {
        let json = r#"{
            "page": {"metrics": {"documentWidth": 100, "documentHeight": 100,
                                 "viewportWidth": 100, "viewportHeight": 100}},
            "steps": [{"atMs": 0}]
        }"#;
        assert!(matches!(
            Recording::from_json(json),
            Err(HeatGridError::InvalidRecording(_))
        ));
    }

    #[test]
    fn test_mutation_replaces_page_elements() {
        let page = StaticPage::from_json(
            r#"{"metrics": {"documentWidth": 800, "documentHeight": 800,
                            "viewportWidth": 800, "viewportHeight": 800}}"#,
        )
        .unwrap();
        let mut driver = SessionDriver::new(HeatGridConfig::default(), page).unwrap();
        let t0 = "2026-03-02T15:00:00Z".parse::<DateTime<Utc>>().unwrap();

        driver.command(Command::Start, t0);
        let event = HostEvent::from_json(
            r#"{"type": "mutation", "elements": [
                {"node": 9, "tag": "li", "rect": {"top": 10, "left": 10, "width": 200, "height": 20},
                 "text": "Late loaded item"}
            ]}"#,
        )
        .unwrap();
        driver.event(event, t0 + Duration::milliseconds(100)).unwrap();
        assert_eq!(driver.page.elements.len(), 1);
        assert!(driver.session.catalog().is_empty());

        driver.advance(t0 + Duration::milliseconds(2100));
        assert_eq!(driver.session.catalog().len(), 1);
    }
}

//! Command channel wire types
//!
//! Requests are JSON objects tagged by `action`; host events are tagged by
//! `type`. Responses are plain objects whose shape depends on the command.

use crate::analytics::AnalyticsSnapshot;
use crate::error::HeatGridError;
use crate::types::ElementSnapshot;
use serde::{Deserialize, Serialize};

/// Request from the UI to the page session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "startTracking", alias = "start")]
    Start,
    #[serde(rename = "pauseTracking", alias = "pause")]
    Pause,
    #[serde(rename = "stopTracking", alias = "stop")]
    Stop,
    #[serde(rename = "showHeatmap", alias = "show")]
    Show,
    #[serde(rename = "hideHeatmap", alias = "hide")]
    Hide,
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "getStatus")]
    GetStatus,
    #[serde(rename = "getAnalytics")]
    GetAnalytics,
    #[serde(rename = "pinPanel", alias = "pin")]
    Pin,
    #[serde(rename = "unpinPanel", alias = "unpin")]
    Unpin,
}

impl Command {
    /// Parse a request; unknown actions are rejected
    pub fn from_json(json: &str) -> Result<Self, HeatGridError> {
        serde_json::from_str(json).map_err(|e| HeatGridError::InvalidCommand(e.to_string()))
    }

    /// Canonical wire name
    pub fn action(&self) -> &'static str {
        match self {
            Command::Start => "startTracking",
            Command::Pause => "pauseTracking",
            Command::Stop => "stopTracking",
            Command::Show => "showHeatmap",
            Command::Hide => "hideHeatmap",
            Command::Clear => "clear",
            Command::GetStatus => "getStatus",
            Command::GetAnalytics => "getAnalytics",
            Command::Pin => "pinPanel",
            Command::Unpin => "unpinPanel",
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            is_paused: None,
            error: None,
        }
    }

    pub fn paused(is_paused: bool) -> Self {
        Self {
            is_paused: Some(is_paused),
            ..Self::ok()
        }
    }

    pub fn failed(error: &HeatGridError) -> Self {
        Self {
            success: false,
            is_paused: None,
            error: Some(error.to_string()),
        }
    }
}

/// Response to `getStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub is_tracking: bool,
    pub is_visible: bool,
    pub is_paused: bool,
    pub is_pinned: bool,
}

/// Any command response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Ack(Ack),
    Status(StatusReport),
    Analytics(Box<AnalyticsSnapshot>),
}

impl Response {
    /// False only for failed acknowledgements
    pub fn is_success(&self) -> bool {
        match self {
            Response::Ack(ack) => ack.success,
            _ => true,
        }
    }

    pub fn to_json(&self) -> Result<String, HeatGridError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Input observed on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    /// Pointer moved to a document point
    PointerMove { x: f64, y: f64 },
    /// Click at a document point
    Click { x: f64, y: f64 },
    /// Viewport scrolled to a new offset
    #[serde(rename_all = "camelCase")]
    Scroll {
        #[serde(default)]
        scroll_x: f64,
        scroll_y: f64,
    },
    /// Window or document resized
    #[serde(rename_all = "camelCase")]
    Resize {
        document_width: f64,
        document_height: f64,
        viewport_width: f64,
        viewport_height: f64,
    },
    /// DOM subtree changed; optionally carries the new element list
    Mutation {
        #[serde(default)]
        elements: Option<Vec<ElementSnapshot>>,
    },
    /// Display refresh callback
    Frame,
    /// Clock moved forward with no input
    Advance,
}

impl HostEvent {
    pub fn from_json(json: &str) -> Result<Self, HeatGridError> {
        serde_json::from_str(json).map_err(|e| HeatGridError::InvalidCommand(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_names_and_aliases() {
        assert_eq!(
            Command::from_json(r#"{"action":"startTracking"}"#).unwrap(),
            Command::Start
        );
        assert_eq!(Command::from_json(r#"{"action":"start"}"#).unwrap(), Command::Start);
        assert_eq!(Command::from_json(r#"{"action":"unpin"}"#).unwrap(), Command::Unpin);
        assert_eq!(
            serde_json::to_string(&Command::GetAnalytics).unwrap(),
            r#"{"action":"getAnalytics"}"#
        );
        assert_eq!(Command::Hide.action(), "hideHeatmap");
    }

    #[test]
    fn test_unknown_action_is_invalid() {
        let err = Command::from_json(r#"{"action":"explode"}"#).unwrap_err();
        assert!(matches!(err, HeatGridError::InvalidCommand(_)));
    }

    #[test]
    fn test_ack_shapes() {
        assert_eq!(
            Response::Ack(Ack::paused(false)).to_json().unwrap(),
            r#"{"success":true,"isPaused":false}"#
        );
        assert_eq!(Response::Ack(Ack::ok()).to_json().unwrap(), r#"{"success":true}"#);

        let failed = Response::Ack(Ack::failed(&HeatGridError::HostRead("gone".to_string())));
        assert!(!failed.is_success());
        assert!(failed.to_json().unwrap().contains(r#""error":"Failed to read page state: gone""#));
    }

    #[test]
    fn test_status_shape() {
        let status = Response::Status(StatusReport {
            is_tracking: true,
            is_visible: false,
            is_paused: false,
            is_pinned: true,
        });
        assert_eq!(
            status.to_json().unwrap(),
            r#"{"isTracking":true,"isVisible":false,"isPaused":false,"isPinned":true}"#
        );
    }

    #[test]
    fn test_host_event_parsing() {
        assert_eq!(
            HostEvent::from_json(r#"{"type":"scroll","scrollY":420}"#).unwrap(),
            HostEvent::Scroll {
                scroll_x: 0.0,
                scroll_y: 420.0
            }
        );
        assert_eq!(
            HostEvent::from_json(r#"{"type":"pointerMove","x":10,"y":20}"#).unwrap(),
            HostEvent::PointerMove { x: 10.0, y: 20.0 }
        );
        assert_eq!(
            HostEvent::from_json(r#"{"type":"mutation"}"#).unwrap(),
            HostEvent::Mutation { elements: None }
        );
    }
}

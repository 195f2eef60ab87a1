//! Session report encoding
//!
//! Bundles a session's analytics with producer metadata and a summary of the
//! grid and heat map into a single JSON document.

use crate::analytics::AnalyticsSnapshot;
use crate::color::Theme;
use crate::command::StatusReport;
use crate::error::HeatGridError;
use crate::grid::GridSummary;
use crate::session::Session;
use crate::{HEATGRID_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Attention state at the time of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionSummary {
    pub grid: GridSummary,
    pub heat_cells: usize,
    pub tracked_elements: usize,
    pub viewed_elements: usize,
    pub theme: Theme,
}

/// Full session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub producer: ReportProducer,
    pub session_id: String,
    pub computed_at_utc: String,
    pub status: StatusReport,
    pub attention: AttentionSummary,
    pub analytics: AnalyticsSnapshot,
}

/// Encoder for session reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a report stamped with the host's `now`
    pub fn encode(
        &self,
        session: &Session,
        analytics: AnalyticsSnapshot,
        now: DateTime<Utc>,
    ) -> SessionReport {
        let catalog = session.catalog().elements();

        SessionReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: HEATGRID_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session_id: session.id().to_string(),
            computed_at_utc: now.to_rfc3339(),
            status: session.status(),
            attention: AttentionSummary {
                grid: session.grid().summary(),
                heat_cells: session.heat().len(),
                tracked_elements: catalog.len(),
                viewed_elements: catalog
                    .iter()
                    .filter(|e| e.dwell_score > crate::analytics::VIEWED_DWELL)
                    .count(),
                theme: session.theme(),
            },
            analytics,
        }
    }

    /// Encode to pretty JSON
    pub fn encode_to_json(
        &self,
        session: &Session,
        analytics: AnalyticsSnapshot,
        now: DateTime<Utc>,
    ) -> Result<String, HeatGridError> {
        let report = self.encode(session, analytics, now);
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

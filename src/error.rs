//! Error types for UX HeatGrid

use thiserror::Error;

/// Errors that can occur while tracking or evaluating a page
#[derive(Debug, Error)]
pub enum HeatGridError {
    #[error("Failed to read page state: {0}")]
    HostRead(String),

    #[error("Failed to read element {node}: {reason}")]
    ElementRead { node: u64, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Receiving end not available: {0}")]
    ChannelUnavailable(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid recording: {0}")]
    InvalidRecording(String),
}

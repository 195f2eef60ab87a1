//! UX HeatGrid - Attention heat grid and UX density scoring for web pages
//!
//! HeatGrid watches how a reader moves through a page (pointer position,
//! clicks, scrolling, dwell over content) and turns it into two outputs:
//! a spatial heat grid rendered as a translucent overlay, and a composite
//! UX quality score with categorized feedback.
//!
//! ## Modules
//!
//! - **Attention engine**: element catalog → dwell accrual and mouse heat →
//!   grid rebuild → colour mapping and overlay frames
//! - **UX evaluator**: density, white space, complexity and readability scoring
//!   with tiered feedback
//! - **Session**: command surface, host-driven timers and the analytics cache
//!
//! The library never touches a real document. Hosts implement [`PageHost`]
//! and [`Surface`] and drive the clock through [`Session::advance`].

pub mod analytics;
pub mod attention;
pub mod catalog;
pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod error;
pub mod grid;
pub mod heat;
pub mod host;
pub mod panel;
pub mod rebuild;
pub mod recording;
pub mod render;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod types;
pub mod ux;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use analytics::AnalyticsSnapshot;
pub use command::{Command, HostEvent, Response};
pub use config::HeatGridConfig;
pub use error::HeatGridError;
pub use host::{PageHost, StaticPage, Surface};
pub use recording::{replay, Recording, SessionDriver};
pub use report::{ReportEncoder, SessionReport};
pub use session::{Session, TrackingState};

// Evaluator exports
pub use ux::{evaluate, evaluate_page, PageGeometry, UxEvaluation, UxLabel};

/// HeatGrid version embedded in reports
pub const HEATGRID_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "ux-heatgrid";

//! Views
//!
//! Each view owns its load state and request context and turns backend
//! payloads into terminal output. Derivations come from
//! `cev_common::aggregation`; this module only draws them.

pub mod charts;
pub mod dashboard;
pub mod detail;
pub mod summary;

pub use dashboard::{render_dashboard, DashboardPresentation, DashboardView};
pub use detail::{render_detail, DetailView};
pub use summary::{render_summary, SummaryView};

use crate::error::Result;
use serde::Serialize;

/// Recovery hint shown under read errors.
pub const BACK_TO_DASHBOARD: &str = "Run 'cev list' to go back to the dashboard.";

/// Pretty JSON for `--format json`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

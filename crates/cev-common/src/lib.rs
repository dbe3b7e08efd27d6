//! CEV Common Library
//!
//! Shared types, presentation derivations and logging for the Chemical
//! Equipment Visualizer client.
//!
//! # Overview
//!
//! - **Types**: the data contracts served by the backend (users, datasets,
//!   equipment records, summary statistics)
//! - **Aggregation**: pure functions turning those payloads into dashboard
//!   rollups, chart series and table rows
//! - **Logging**: `tracing` subscriber setup shared by every binary
//! - **Error Handling**: [`CevError`] and the crate [`Result`] alias
//!
//! # Example
//!
//! ```no_run
//! use cev_common::aggregation::dashboard_stats;
//! use cev_common::types::DatasetSummary;
//!
//! fn headline(datasets: &[DatasetSummary]) -> String {
//!     let stats = dashboard_stats(datasets);
//!     format!("{} datasets, {} equipment", stats.dataset_count, stats.total_equipment)
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod aggregation;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CevError, Result};

//! Presentation derivations
//!
//! Pure functions from backend payloads to the structures the dashboard and
//! dataset detail views display. Nothing here mutates its input: display
//! formatting produces new strings and leaves the stored values untouched.

use crate::types::{DatasetDetail, DatasetSummary, Equipment};
use serde::Serialize;

/// Number of records shown in the parameter comparison chart.
pub const COMPARISON_LIMIT: usize = 10;

/// Maximum characters of an equipment name used as a chart label.
pub const LABEL_MAX_CHARS: usize = 15;

/// Decimal places used in the equipment table and detail stat cards.
pub const TABLE_PRECISION: usize = 2;

/// Decimal places used on dashboard cards.
pub const DASHBOARD_PRECISION: usize = 1;

/// Unit appended to displayed temperatures.
pub const TEMPERATURE_UNIT: &str = "°C";

// ============================================================================
// List context
// ============================================================================

/// Rollups over every dataset in the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub dataset_count: usize,
    pub total_equipment: u64,
    /// Arithmetic mean of the per-dataset averages, zero for an empty list
    pub mean_temperature: f64,
}

pub fn dashboard_stats(datasets: &[DatasetSummary]) -> DashboardStats {
    let total_equipment = datasets.iter().map(|d| d.total_count).sum();

    let mean_temperature = if datasets.is_empty() {
        0.0
    } else {
        datasets.iter().map(DatasetSummary::avg_temperature).sum::<f64>() / datasets.len() as f64
    };

    DashboardStats {
        dataset_count: datasets.len(),
        total_equipment,
        mean_temperature,
    }
}

// ============================================================================
// Detail context
// ============================================================================

/// One bar/slice of the equipment type charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub label: String,
    pub count: u64,
}

/// Equipment count per type. Feeds both the distribution bar chart and the
/// breakdown pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub title: String,
    pub points: Vec<CategoryPoint>,
}

impl CategorySeries {
    pub fn total(&self) -> u64 {
        self.points.iter().map(|p| p.count).sum()
    }

    /// Percentage share of each point, in point order. All zero when the
    /// series is empty or every count is zero.
    pub fn shares(&self) -> Vec<f64> {
        let total = self.total();
        self.points
            .iter()
            .map(|p| {
                if total == 0 {
                    0.0
                } else {
                    p.count as f64 * 100.0 / total as f64
                }
            })
            .collect()
    }
}

pub fn type_distribution(detail: &DatasetDetail) -> CategorySeries {
    CategorySeries {
        title: "Equipment Count".to_string(),
        points: detail
            .equipment_types
            .iter()
            .map(|(label, count)| CategoryPoint {
                label: label.clone(),
                count: *count,
            })
            .collect(),
    }
}

/// One named value series of the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Grouped bar chart comparing flowrate, pressure and temperature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonChart {
    /// Truncated equipment names, display only
    pub labels: Vec<String>,
    pub series: Vec<ValueSeries>,
}

impl ComparisonChart {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Comparison over the first [`COMPARISON_LIMIT`] records, in given order.
pub fn parameter_comparison(records: &[Equipment]) -> ComparisonChart {
    let head = &records[..records.len().min(COMPARISON_LIMIT)];

    let series = |name: &str, pick: fn(&Equipment) -> f64| ValueSeries {
        name: name.to_string(),
        values: head.iter().map(pick).collect(),
    };

    ComparisonChart {
        labels: head
            .iter()
            .map(|eq| truncate_label(&eq.equipment_name))
            .collect(),
        series: vec![
            series("Flowrate", |eq| eq.flowrate),
            series("Pressure", |eq| eq.pressure),
            series("Temperature", |eq| eq.temperature),
        ],
    }
}

/// One formatted row of the equipment table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentRow {
    pub name: String,
    pub equipment_type: String,
    pub flowrate: String,
    pub pressure: String,
    pub temperature: String,
}

pub fn equipment_table(records: &[Equipment]) -> Vec<EquipmentRow> {
    records
        .iter()
        .map(|eq| EquipmentRow {
            name: eq.equipment_name.clone(),
            equipment_type: eq.equipment_type.clone(),
            flowrate: format_fixed(eq.flowrate, TABLE_PRECISION),
            pressure: format_fixed(eq.pressure, TABLE_PRECISION),
            temperature: format_temperature(eq.temperature, TABLE_PRECISION),
        })
        .collect()
}

/// Headline cards of the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailCards {
    pub total_equipment: u64,
    pub avg_flowrate: String,
    pub avg_pressure: String,
    pub avg_temperature: String,
}

/// Everything the detail view renders, derived in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailPresentation {
    pub name: String,
    pub uploaded_at: String,
    pub cards: DetailCards,
    pub type_distribution: CategorySeries,
    pub comparison: ComparisonChart,
    pub table: Vec<EquipmentRow>,
}

pub fn present_detail(detail: &DatasetDetail) -> DetailPresentation {
    let summary = &detail.summary;

    DetailPresentation {
        name: summary.name.clone(),
        uploaded_at: summary.uploaded_at_display(),
        cards: DetailCards {
            total_equipment: summary.total_count,
            avg_flowrate: format_fixed(summary.avg_flowrate(), TABLE_PRECISION),
            avg_pressure: format_fixed(summary.avg_pressure(), TABLE_PRECISION),
            avg_temperature: format_temperature(summary.avg_temperature(), TABLE_PRECISION),
        },
        type_distribution: type_distribution(detail),
        comparison: parameter_comparison(&detail.equipment),
        table: equipment_table(&detail.equipment),
    }
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// First [`LABEL_MAX_CHARS`] characters of a name.
pub fn truncate_label(name: &str) -> String {
    name.chars().take(LABEL_MAX_CHARS).collect()
}

pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

pub fn format_temperature(value: f64, decimals: usize) -> String {
    format!("{}{}", format_fixed(value, decimals), TEMPERATURE_UNIT)
}

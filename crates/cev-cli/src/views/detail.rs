//! Dataset detail: stat cards, type charts, parameter comparison and the
//! equipment table of one dataset

use crate::error::Result;
use crate::state::{AsyncState, RequestContext, RequestTicket};
use crate::views::charts;
use cev_common::aggregation::{present_detail, DetailPresentation};
use cev_common::types::{DatasetDetail, DatasetId};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Table};
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "Failed to load dataset";
pub const NOT_FOUND: &str = "Dataset not found";

#[derive(Debug)]
pub struct DetailView {
    id: DatasetId,
    state: AsyncState<DatasetDetail>,
    context: RequestContext,
}

impl DetailView {
    pub fn new(id: DatasetId) -> Self {
        Self {
            id,
            state: AsyncState::default(),
            context: RequestContext::new(),
        }
    }

    pub fn state(&self) -> &AsyncState<DatasetDetail> {
        &self.state
    }

    pub fn begin_load(&mut self) -> RequestTicket {
        self.state.start();
        self.context.ticket()
    }

    /// An empty answer is the "not found" error state. Answers for a view
    /// that was left are dropped.
    pub fn finish_load(&mut self, ticket: RequestTicket, result: Result<Option<DatasetDetail>>) {
        if !ticket.is_current() {
            debug!(dataset_id = %self.id, "Dataset arrived after the view was left");
            self.state.reset();
            return;
        }

        self.state.finish(match result {
            Ok(Some(detail)) => Ok(detail),
            Ok(None) => Err(NOT_FOUND.to_string()),
            Err(e) => {
                warn!(dataset_id = %self.id, error = %e, "Loading dataset failed");
                Err(LOAD_FAILED.to_string())
            },
        });
    }

    pub fn leave(&self) {
        self.context.invalidate();
    }

    pub fn presentation(&self) -> Option<DetailPresentation> {
        self.state.value().map(present_detail)
    }
}

fn section(title: &str) -> String {
    format!("\n{}\n{}", title.bold(), "─".repeat(title.chars().count()).blue())
}

pub fn render_detail(id: DatasetId, presentation: &DetailPresentation) -> String {
    let cards = &presentation.cards;
    let mut out = Vec::new();

    out.push(format!("{} {}", presentation.name.bold(), format!("(#{})", id).dimmed()));
    out.push(format!("Uploaded: {}", presentation.uploaded_at));
    out.push(String::new());
    out.push(format!(
        "{} {}   {} {}   {} {}   {} {}",
        "Total Equipment:".dimmed(),
        cards.total_equipment.to_string().cyan().bold(),
        "Avg Flowrate:".dimmed(),
        cards.avg_flowrate.cyan().bold(),
        "Avg Pressure:".dimmed(),
        cards.avg_pressure.cyan().bold(),
        "Avg Temperature:".dimmed(),
        cards.avg_temperature.cyan().bold(),
    ));

    out.push(section("Equipment Type Distribution"));
    out.extend(charts::distribution_bars(&presentation.type_distribution));

    out.push(section("Equipment Type Breakdown"));
    out.extend(charts::breakdown_rows(&presentation.type_distribution));

    out.push(section("Parameter Comparison (first 10)"));
    out.extend(charts::comparison_bars(&presentation.comparison));

    out.push(section("Equipment Details"));
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"]);
    for row in &presentation.table {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.equipment_type),
            Cell::new(&row.flowrate).set_alignment(CellAlignment::Right),
            Cell::new(&row.pressure).set_alignment(CellAlignment::Right),
            Cell::new(&row.temperature).set_alignment(CellAlignment::Right),
        ]);
    }
    out.push(table.to_string());

    out.push(String::new());
    out.push(format!("Download the PDF report with {}", format!("cev report {}", id).cyan()));
    out.join("\n")
}

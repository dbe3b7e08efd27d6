//! Per-parameter statistics of one dataset

use crate::error::Result;
use crate::state::{AsyncState, RequestContext, RequestTicket};
use cev_common::aggregation::{format_fixed, TABLE_PRECISION};
use cev_common::types::{DatasetId, DatasetStatistics, ParameterRange};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Table};
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "Failed to load dataset summary";

#[derive(Debug)]
pub struct SummaryView {
    id: DatasetId,
    state: AsyncState<DatasetStatistics>,
    context: RequestContext,
}

impl SummaryView {
    pub fn new(id: DatasetId) -> Self {
        Self {
            id,
            state: AsyncState::default(),
            context: RequestContext::new(),
        }
    }

    pub fn state(&self) -> &AsyncState<DatasetStatistics> {
        &self.state
    }

    pub fn begin_load(&mut self) -> RequestTicket {
        self.state.start();
        self.context.ticket()
    }

    pub fn finish_load(&mut self, ticket: RequestTicket, result: Result<DatasetStatistics>) {
        if !ticket.is_current() {
            debug!(dataset_id = %self.id, "Summary arrived after the view was left");
            self.state.reset();
            return;
        }

        self.state.finish(result.map_err(|e| {
            warn!(dataset_id = %self.id, error = %e, "Loading summary failed");
            LOAD_FAILED.to_string()
        }));
    }

    pub fn leave(&self) {
        self.context.invalidate();
    }
}

fn range_row(name: &str, range: &ParameterRange) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(format_fixed(range.min, TABLE_PRECISION)).set_alignment(CellAlignment::Right),
        Cell::new(format_fixed(range.average, TABLE_PRECISION)).set_alignment(CellAlignment::Right),
        Cell::new(format_fixed(range.max, TABLE_PRECISION)).set_alignment(CellAlignment::Right),
    ]
}

pub fn render_summary(stats: &DatasetStatistics) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{} {}",
        stats.dataset_name.bold(),
        format!("(#{}, {} records)", stats.dataset_id, stats.total_count).dimmed()
    ));
    out.push(String::new());

    let mut ranges = Table::new();
    ranges
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Parameter", "Min", "Average", "Max"]);
    ranges.add_row(range_row("Flowrate", &stats.statistics.flowrate));
    ranges.add_row(range_row("Pressure", &stats.statistics.pressure));
    ranges.add_row(range_row("Temperature", &stats.statistics.temperature));
    out.push(ranges.to_string());

    if !stats.type_distribution.is_empty() {
        let mut types = Table::new();
        types
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Type", "Count", "Share"]);
        for share in &stats.type_distribution {
            types.add_row(vec![
                Cell::new(&share.equipment_type),
                Cell::new(share.count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{}%", format_fixed(share.percentage, 1))).set_alignment(CellAlignment::Right),
            ]);
        }
        out.push(String::new());
        out.push(types.to_string());
    }

    out.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::DatasetApi;
    use crate::testing::FakeApi;
    use cev_common::types::{ParameterStatistics, TypeShare};

    async fn load(view: &mut SummaryView, api: &FakeApi) {
        let ticket = view.begin_load();
        let result = api.get_dataset_summary(view.id).await;
        view.finish_load(ticket, result);
    }

    fn statistics() -> DatasetStatistics {
        let range = |min, average, max| ParameterRange { average, min, max };
        DatasetStatistics {
            dataset_id: DatasetId(4),
            dataset_name: "Plant North".to_string(),
            uploaded_at: "2024-03-01T09:30:00Z".to_string(),
            total_count: 5,
            statistics: ParameterStatistics {
                flowrate: range(90.0, 120.5, 150.0),
                pressure: range(4.0, 5.5, 7.0),
                temperature: range(60.0, 85.25, 110.0),
            },
            type_distribution: vec![TypeShare {
                equipment_type: "Pump".to_string(),
                count: 2,
                percentage: 40.0,
            }],
        }
    }

    #[tokio::test]
    async fn test_load_and_render() {
        let api = FakeApi {
            statistics: Some(statistics()),
            ..Default::default()
        };
        let mut view = SummaryView::new(DatasetId(4));
        load(&mut view, &api).await;

        let stats = view.state().value().unwrap();
        let text = render_summary(stats);
        assert!(text.contains("Plant North"));
        assert!(text.contains("120.50"));
        assert!(text.contains("40.0%"));
    }

    #[tokio::test]
    async fn test_failure_is_error_state() {
        let api = FakeApi::default();
        let mut view = SummaryView::new(DatasetId(4));
        load(&mut view, &api).await;
        assert_eq!(view.state().error().map(String::as_str), Some(LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_answer_after_leave_is_discarded() {
        let api = FakeApi {
            statistics: Some(statistics()),
            ..Default::default()
        };
        let mut view = SummaryView::new(DatasetId(4));

        let ticket = view.begin_load();
        view.leave();
        view.finish_load(ticket, api.get_dataset_summary(DatasetId(4)).await);

        assert_eq!(view.state(), &AsyncState::Idle);
    }
}

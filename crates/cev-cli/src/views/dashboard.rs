//! Dashboard: every dataset of the current user plus list rollups

use crate::error::Result;
use crate::state::{AsyncState, RequestContext, RequestTicket};
use cev_common::aggregation::{dashboard_stats, format_fixed, format_temperature, DashboardStats, DASHBOARD_PRECISION};
use cev_common::types::{DatasetSummary, User};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Table};
use serde::Serialize;
use tracing::{debug, warn};

pub const LOAD_FAILED: &str = "Failed to load datasets";

#[derive(Debug, Default)]
pub struct DashboardView {
    state: AsyncState<Vec<DatasetSummary>>,
    context: RequestContext,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AsyncState<Vec<DatasetSummary>> {
        &self.state
    }

    /// Move to `Pending` and hand out the ticket the answer must carry.
    pub fn begin_load(&mut self) -> RequestTicket {
        self.state.start();
        self.context.ticket()
    }

    /// Apply the answer, unless the view was left since [`begin_load`].
    ///
    /// [`begin_load`]: DashboardView::begin_load
    pub fn finish_load(&mut self, ticket: RequestTicket, result: Result<Vec<DatasetSummary>>) {
        if !ticket.is_current() {
            debug!("Dataset list arrived after the dashboard was left");
            self.state.reset();
            return;
        }

        self.state.finish(result.map_err(|e| {
            warn!(error = %e, "Listing datasets failed");
            LOAD_FAILED.to_string()
        }));
    }

    pub fn leave(&self) {
        self.context.invalidate();
    }

    pub fn presentation(&self) -> Option<DashboardPresentation> {
        self.state.value().map(|datasets| DashboardPresentation {
            stats: dashboard_stats(datasets),
            datasets: datasets.clone(),
        })
    }
}

/// What `cev list --format json` prints.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPresentation {
    pub stats: DashboardStats,
    pub datasets: Vec<DatasetSummary>,
}

pub fn render_dashboard(user: &User, presentation: &DashboardPresentation) -> String {
    let stats = &presentation.stats;
    let mut out = Vec::new();

    out.push(format!("{}", format!("Welcome, {}!", user.username).bold()));
    out.push(String::new());
    out.push(format!(
        "{} {}   {} {}   {} {}",
        "Total Datasets:".dimmed(),
        stats.dataset_count.to_string().cyan().bold(),
        "Total Equipment:".dimmed(),
        stats.total_equipment.to_string().cyan().bold(),
        "Avg Temperature:".dimmed(),
        format_temperature(stats.mean_temperature, DASHBOARD_PRECISION).cyan().bold(),
    ));
    out.push(String::new());

    if presentation.datasets.is_empty() {
        out.push("No datasets yet".yellow().to_string());
        out.push(format!("Upload your first dataset with {}", "cev upload <file.csv>".cyan()));
        return out.join("\n");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Name", "Uploaded", "Equipment", "Avg Flowrate", "Avg Pressure", "Avg Temp"]);

    for dataset in &presentation.datasets {
        table.add_row(vec![
            Cell::new(dataset.id),
            Cell::new(&dataset.name),
            Cell::new(dataset.uploaded_at_display()),
            Cell::new(dataset.total_count).set_alignment(CellAlignment::Right),
            Cell::new(format_fixed(dataset.avg_flowrate(), DASHBOARD_PRECISION)).set_alignment(CellAlignment::Right),
            Cell::new(format_fixed(dataset.avg_pressure(), DASHBOARD_PRECISION)).set_alignment(CellAlignment::Right),
            Cell::new(format_temperature(dataset.avg_temperature(), DASHBOARD_PRECISION))
                .set_alignment(CellAlignment::Right),
        ]);
    }

    out.push(table.to_string());
    out.push(String::new());
    out.push(format!("Open a dataset with {}", "cev show <id>".cyan()));
    out.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::DatasetApi;
    use crate::testing::{sample_summary, sample_user, FakeApi};

    async fn load(view: &mut DashboardView, api: &FakeApi) {
        let ticket = view.begin_load();
        let result = api.list_datasets().await;
        view.finish_load(ticket, result);
    }

    #[tokio::test]
    async fn test_load_and_present() {
        let api = FakeApi {
            datasets: vec![sample_summary(1, "North"), sample_summary(2, "South")],
            ..Default::default()
        };
        let mut view = DashboardView::new();
        load(&mut view, &api).await;

        let presentation = view.presentation().unwrap();
        assert_eq!(presentation.stats.dataset_count, 2);
        assert_eq!(presentation.stats.total_equipment, 4);

        let text = render_dashboard(&sample_user("ada"), &presentation);
        assert!(text.contains("Welcome, ada!"));
        assert!(text.contains("North"));
        assert!(text.contains("80.4°C"));
    }

    #[tokio::test]
    async fn test_empty_list_renders_zeroes() {
        let api = FakeApi::default();
        let mut view = DashboardView::new();
        load(&mut view, &api).await;

        let presentation = view.presentation().unwrap();
        assert_eq!(presentation.stats.mean_temperature, 0.0);

        let text = render_dashboard(&sample_user("ada"), &presentation);
        assert!(text.contains("No datasets yet"));
        assert!(text.contains("0.0°C"));
    }

    #[tokio::test]
    async fn test_load_failure_is_error_state() {
        let api = FakeApi {
            list_error: Some((500, Some("database unavailable"))),
            ..Default::default()
        };
        let mut view = DashboardView::new();
        load(&mut view, &api).await;

        assert_eq!(view.state().error().map(String::as_str), Some(LOAD_FAILED));
        assert!(view.presentation().is_none());
    }

    #[tokio::test]
    async fn test_answer_after_leave_is_discarded() {
        let api = FakeApi {
            datasets: vec![sample_summary(1, "North")],
            ..Default::default()
        };
        let mut view = DashboardView::new();

        let ticket = view.begin_load();
        assert!(view.state().is_pending());
        view.leave();
        view.finish_load(ticket, api.list_datasets().await);

        assert_eq!(view.state(), &AsyncState::Idle);
        assert!(view.presentation().is_none());

        load(&mut view, &api).await;
        assert_eq!(view.presentation().unwrap().stats.dataset_count, 1);
    }
}

//! `cev list`, `cev show`, `cev summary` and `cev delete`

use crate::commands::AppContext;
use crate::error::{CliError, Result};
use crate::routes::Route;
use crate::state::AsyncState;
use crate::views::{
    render_dashboard, render_detail, render_summary, to_json, DashboardView, DetailView, SummaryView,
    BACK_TO_DASHBOARD,
};
use cev_common::types::{DatasetId, User};
use colored::Colorize;
use inquire::Confirm;
use std::future::Future;
use tracing::{debug, info};

const SESSION_EXPIRED: &str = "Your session may have expired. Run 'cev login' again.";

/// Read failures keep their recovery hints next to the message.
fn read_error(message: &str, back_to_dashboard: bool, expired: bool) -> CliError {
    let mut text = message.to_string();
    if expired {
        text.push('\n');
        text.push_str(SESSION_EXPIRED);
    }
    if back_to_dashboard {
        text.push('\n');
        text.push_str(BACK_TO_DASHBOARD);
    }
    CliError::failed(text)
}

fn is_expired<T>(result: &Result<T>) -> bool {
    result.as_ref().err().is_some_and(CliError::is_unauthorized)
}

/// Run `fetch`, or leave the view on Ctrl-C. A left view drops the answer.
async fn fetch_or_leave<T>(fetch: impl Future<Output = Result<T>>, leave: impl FnOnce()) -> Result<T> {
    tokio::select! {
        result = fetch => result,
        _ = tokio::signal::ctrl_c() => {
            leave();
            Err(CliError::failed("Interrupted"))
        },
    }
}

pub async fn list(ctx: &AppContext, format: &str) -> Result<()> {
    let user = ctx.require_user(Route::Dashboard).await?;
    show_dashboard(ctx, &user, format).await
}

/// Dashboard body, shared with login and registration.
pub(crate) async fn show_dashboard(ctx: &AppContext, user: &User, format: &str) -> Result<()> {
    let api = ctx.api();
    let mut view = DashboardView::new();

    let ticket = view.begin_load();
    let result = fetch_or_leave(api.list_datasets(), || view.leave()).await;
    let expired = is_expired(&result);
    view.finish_load(ticket, result);
    ctx.persist_session()?;

    let presentation = match view.state() {
        AsyncState::Failed(message) => return Err(read_error(message, false, expired)),
        AsyncState::Succeeded(_) => view.presentation(),
        AsyncState::Idle | AsyncState::Pending => None,
    };
    let Some(presentation) = presentation else {
        debug!("Dashboard left before the list arrived");
        return Ok(());
    };

    if format == "json" {
        println!("{}", to_json(&presentation)?);
    } else {
        println!("{}", render_dashboard(user, &presentation));
    }
    Ok(())
}

pub async fn show(ctx: &AppContext, id: DatasetId, format: &str) -> Result<()> {
    ctx.require_user(Route::Dataset(id)).await?;
    show_dataset(ctx, id, format).await
}

/// Detail view body, shared with the upload command's navigation.
pub(crate) async fn show_dataset(ctx: &AppContext, id: DatasetId, format: &str) -> Result<()> {
    let api = ctx.api();
    let mut view = DetailView::new(id);

    let ticket = view.begin_load();
    let result = fetch_or_leave(api.get_dataset(id), || view.leave()).await;
    let expired = is_expired(&result);
    view.finish_load(ticket, result);
    ctx.persist_session()?;

    let presentation = match view.state() {
        AsyncState::Failed(message) => return Err(read_error(message, true, expired)),
        AsyncState::Succeeded(_) => view.presentation(),
        AsyncState::Idle | AsyncState::Pending => None,
    };
    let Some(presentation) = presentation else {
        debug!(dataset_id = %id, "Dataset view left before the answer arrived");
        return Ok(());
    };

    if format == "json" {
        println!("{}", to_json(&presentation)?);
    } else {
        println!("{}", render_detail(id, &presentation));
    }
    Ok(())
}

pub async fn summary(ctx: &AppContext, id: DatasetId, format: &str) -> Result<()> {
    ctx.require_user(Route::Summary(id)).await?;
    let api = ctx.api();
    let mut view = SummaryView::new(id);

    let ticket = view.begin_load();
    let result = fetch_or_leave(api.get_dataset_summary(id), || view.leave()).await;
    let expired = is_expired(&result);
    view.finish_load(ticket, result);
    ctx.persist_session()?;

    match view.state() {
        AsyncState::Succeeded(stats) if format == "json" => println!("{}", to_json(stats)?),
        AsyncState::Succeeded(stats) => println!("{}", render_summary(stats)),
        AsyncState::Failed(message) => return Err(read_error(message, true, expired)),
        AsyncState::Idle | AsyncState::Pending => debug!(dataset_id = %id, "Summary view left"),
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: DatasetId, yes: bool) -> Result<()> {
    ctx.require_user(Route::Dataset(id)).await?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete dataset {} and all of its records?", id))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    let api = ctx.api();
    let result = api.delete_dataset(id).await;
    ctx.persist_session()?;
    result.map_err(|e| e.with_fallback("Failed to delete dataset"))?;

    info!(dataset_id = %id, "Dataset deleted");
    println!("{} Deleted dataset {}", "✓".green(), id.to_string().cyan());
    Ok(())
}

//! `cev report` command implementation

use crate::commands::AppContext;
use crate::error::{CliError, Result};
use crate::progress::{create_spinner, finish_err, finish_ok, format_bytes};
use crate::report::{DownloadOutcome, ReportRetrieval};
use crate::routes::Route;
use cev_common::types::DatasetId;
use std::path::PathBuf;

pub async fn run(ctx: &AppContext, id: DatasetId, output_dir: Option<PathBuf>) -> Result<()> {
    ctx.require_user(Route::Dataset(id)).await?;

    let dir = output_dir.unwrap_or_else(|| ctx.config.report_dir.clone());
    let reports = ReportRetrieval::new(ctx.api(), dir);

    let pb = create_spinner(&format!("Generating report for dataset {}...", id));
    let outcome = reports.download(id).await;
    ctx.persist_session()?;

    match outcome {
        DownloadOutcome::Saved { path, size } => {
            finish_ok(&pb, &format!("Report saved to {} ({})", path.display(), format_bytes(size)));
            Ok(())
        },
        DownloadOutcome::AlreadyRunning => {
            pb.finish_and_clear();
            Ok(())
        },
        DownloadOutcome::Failed(message) => {
            finish_err(&pb, &message);
            Err(CliError::failed(message))
        },
    }
}

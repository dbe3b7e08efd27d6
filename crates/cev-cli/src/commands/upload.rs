//! `cev upload` command implementation

use crate::commands::{datasets, AppContext};
use crate::error::{CliError, Result};
use crate::progress::{create_spinner, finish_err, finish_ok};
use crate::routes::Route;
use crate::upload::{CandidateFile, SelectionSource, UploadForm, UploadOutcome};
use colored::Colorize;
use std::path::Path;
use tracing::debug;

pub struct UploadArgs<'a> {
    pub file: &'a Path,
    pub name: Option<String>,
    /// Treat the file as dropped rather than picked
    pub dropped: bool,
    /// Stay here instead of opening the new dataset
    pub no_open: bool,
}

pub async fn run(ctx: &AppContext, args: UploadArgs<'_>) -> Result<()> {
    ctx.require_user(Route::Upload).await?;

    let mut form = UploadForm::new();
    if let Some(name) = args.name {
        form.set_name(name);
    }

    let source = if args.dropped {
        SelectionSource::Drop
    } else {
        SelectionSource::Picker
    };
    let file = CandidateFile::from_path(args.file).await?;
    form.set_candidate(file, source)?;

    if let Some(candidate) = form.candidate() {
        println!(
            "{} {} ({})",
            "Selected:".dimmed(),
            candidate.file_name.cyan(),
            candidate.size_kb()
        );
    }
    println!("{} {}", "Name:".dimmed(), form.name());

    let api = ctx.api();
    let pb = create_spinner("Uploading...");
    let outcome = form.submit(api.as_ref()).await;
    ctx.persist_session()?;

    match outcome {
        Ok(UploadOutcome::Uploaded { dataset, navigation }) => {
            finish_ok(&pb, crate::upload::UPLOAD_SUCCEEDED);
            println!(
                "  Dataset {} has {} records",
                dataset.id.to_string().cyan(),
                dataset.total_count
            );

            if args.no_open {
                return Ok(());
            }

            debug!(route = %navigation.target(), "Navigation scheduled");
            println!(
                "  Opening it in {:.1}s (Ctrl-C to stay here)",
                navigation.remaining().as_secs_f64()
            );
            let route = tokio::select! {
                route = navigation.fire() => route,
                _ = tokio::signal::ctrl_c() => {
                    form.leave();
                    None
                },
            };

            match route {
                Some(Route::Dataset(id)) => datasets::show_dataset(ctx, id, "table").await,
                other => {
                    debug!(?other, "Navigation cancelled");
                    Ok(())
                },
            }
        },
        Ok(UploadOutcome::Failed(message)) => {
            finish_err(&pb, &message);
            Err(CliError::failed(message))
        },
        Ok(UploadOutcome::Discarded) => {
            pb.finish_and_clear();
            Ok(())
        },
        Err(e) => {
            pb.finish_and_clear();
            Err(e)
        },
    }
}

//! Upload orchestration
//!
//! [`UploadForm`] holds the candidate file and display name and walks one
//! upload through `Idle -> Pending -> Succeeded | Failed`. The request itself
//! is split into [`UploadForm::begin_submit`] and [`UploadForm::finish_submit`]
//! so the state machine can be driven without a network;
//! [`UploadForm::submit`] runs both around a [`DatasetApi`] call.

use crate::api::{DatasetApi, UploadPayload};
use crate::error::{CliError, Result};
use crate::routes::Route;
use crate::state::{AsyncState, RequestContext, RequestTicket, ScheduledTransition};
use cev_common::types::DatasetSummary;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause between the success message and opening the new dataset.
pub const CONFIRMATION_DELAY: Duration = Duration::from_millis(1500);

pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Upload failed. Please try again.";
pub const NO_FILE_SELECTED: &str = "Please select a file";
pub const NOT_A_CSV_DROP: &str = "Please drop a CSV file";

/// How a file reached the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Picker,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl CandidateFile {
    pub fn new(file_name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            contents,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::validation(format!("{} is not a file", path.display())))?;
        let contents = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, contents))
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Size as shown next to the selected file, e.g. `12.50 KB`.
    pub fn size_kb(&self) -> String {
        format!("{:.2} KB", self.size() as f64 / 1024.0)
    }

    /// File name without its last extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }
}

/// A request handed out by [`UploadForm::begin_submit`].
#[derive(Debug)]
pub struct PendingUpload {
    pub payload: UploadPayload,
    pub ticket: RequestTicket,
}

#[derive(Debug)]
pub enum UploadOutcome {
    /// Upload accepted; `navigation` opens the new dataset after the delay
    Uploaded {
        dataset: DatasetSummary,
        navigation: ScheduledTransition<Route>,
    },
    /// Upload rejected; the message is also kept on the form
    Failed(String),
    /// The form was left before the answer arrived
    Discarded,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    candidate: Option<CandidateFile>,
    name: String,
    state: AsyncState<DatasetSummary>,
    context: RequestContext,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate(&self) -> Option<&CandidateFile> {
        self.candidate.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn state(&self) -> &AsyncState<DatasetSummary> {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_pending()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error().map(String::as_str)
    }

    pub fn success_message(&self) -> Option<&'static str> {
        self.state.value().map(|_| UPLOAD_SUCCEEDED)
    }

    /// Single entry point for picker and drop selections.
    ///
    /// Drops must be `.csv` files; picker selections are taken as they are.
    /// A rejected drop leaves the current candidate in place.
    pub fn set_candidate(&mut self, file: CandidateFile, source: SelectionSource) -> Result<()> {
        if source == SelectionSource::Drop && !file.file_name.ends_with(".csv") {
            debug!(file = %file.file_name, "Rejected non-CSV drop");
            return Err(self.reject(NOT_A_CSV_DROP));
        }

        if self.name.is_empty() {
            self.name = file.stem().to_string();
        }
        debug!(file = %file.file_name, size = file.size(), ?source, "Candidate selected");

        self.candidate = Some(file);
        if self.state.error().is_some() {
            self.state.reset();
        }
        Ok(())
    }

    pub fn remove_candidate(&mut self) {
        self.candidate = None;
    }

    /// Validate and move to `Pending`.
    pub fn begin_submit(&mut self) -> Result<PendingUpload> {
        if self.is_busy() {
            return Err(CliError::Busy("Upload"));
        }

        let Some(file) = &self.candidate else {
            return Err(self.reject(NO_FILE_SELECTED));
        };

        let name = if self.name.trim().is_empty() {
            file.file_name.clone()
        } else {
            self.name.trim().to_string()
        };

        let payload = UploadPayload {
            file_name: file.file_name.clone(),
            contents: file.contents.clone(),
            name,
        };

        self.state.start();
        Ok(PendingUpload {
            payload,
            ticket: self.context.ticket(),
        })
    }

    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        result: Result<DatasetSummary>,
    ) -> UploadOutcome {
        if !ticket.is_current() {
            debug!("Upload finished after the form was left, ignoring");
            self.state.reset();
            return UploadOutcome::Discarded;
        }

        match result {
            Ok(dataset) => {
                info!(dataset_id = %dataset.id, name = %dataset.name, "Upload succeeded");
                let navigation =
                    ScheduledTransition::new(Route::Dataset(dataset.id), CONFIRMATION_DELAY, ticket);
                self.state.finish(Ok(dataset.clone()));
                UploadOutcome::Uploaded {
                    dataset,
                    navigation,
                }
            },
            Err(e) => {
                warn!(error = %e, "Upload failed");
                let message = e.user_message(UPLOAD_FAILED);
                self.state.finish(Err(message.clone()));
                UploadOutcome::Failed(message)
            },
        }
    }

    pub async fn submit(&mut self, api: &dyn DatasetApi) -> Result<UploadOutcome> {
        let pending = self.begin_submit()?;
        let result = api.upload_dataset(pending.payload).await;
        Ok(self.finish_submit(pending.ticket, result))
    }

    /// Leaving the form drops late answers and pending navigation.
    pub fn leave(&self) {
        self.context.invalidate();
    }

    fn reject(&mut self, message: &str) -> CliError {
        if !self.is_busy() {
            self.state.finish(Err(message.to_string()));
        }
        CliError::validation(message)
    }
}

//! Report retrieval
//!
//! Fetches the generated report for one dataset and writes it to the report
//! directory. Reports are never cached; every trigger is a fresh request.

use crate::api::DatasetApi;
use crate::error::Result;
use crate::state::ControlLatch;
use cev_common::types::DatasetId;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const REPORT_FAILED: &str = "Failed to download report";

/// `equipment_report_{id}.pdf`
pub fn report_filename(id: DatasetId) -> String {
    format!("equipment_report_{}.pdf", id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written to `path`; `size` is the report length in bytes
    Saved { path: PathBuf, size: u64 },
    /// A download triggered earlier is still running; nothing was done
    AlreadyRunning,
    Failed(String),
}

pub struct ReportRetrieval {
    api: Arc<dyn DatasetApi>,
    output_dir: PathBuf,
    latch: ControlLatch,
}

impl ReportRetrieval {
    pub fn new(api: Arc<dyn DatasetApi>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            output_dir: output_dir.into(),
            latch: ControlLatch::new(),
        }
    }

    pub async fn download(&self, id: DatasetId) -> DownloadOutcome {
        let Some(_guard) = self.latch.try_acquire() else {
            debug!(dataset_id = %id, "Report download already running, ignoring trigger");
            return DownloadOutcome::AlreadyRunning;
        };

        match self.fetch_and_save(id).await {
            Ok((path, size)) => {
                info!(dataset_id = %id, path = %path.display(), size, "Report saved");
                DownloadOutcome::Saved { path, size }
            },
            Err(e) => {
                warn!(dataset_id = %id, error = %e, "Report download failed");
                DownloadOutcome::Failed(REPORT_FAILED.to_string())
            },
        }
    }

    async fn fetch_and_save(&self, id: DatasetId) -> Result<(PathBuf, u64)> {
        let artifact = self.api.get_report(id).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(report_filename(artifact.dataset_id));
        tokio::fs::write(&path, &artifact.bytes).await?;

        Ok((path, artifact.bytes.len() as u64))
    }
}

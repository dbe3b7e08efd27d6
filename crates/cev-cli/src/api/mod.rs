//! Remote data client
//!
//! Typed access to the backend. Every operation is a single round trip with
//! no retry; failures come back as [`CliError::Rejected`] (non-2xx, optional
//! server message) or [`CliError::Http`] (transport).
//!
//! Views and orchestrators depend on the [`DatasetApi`] trait rather than on
//! [`ApiClient`] directly.
//!
//! [`CliError::Rejected`]: crate::error::CliError::Rejected
//! [`CliError::Http`]: crate::error::CliError::Http

pub mod client;
pub mod endpoints;
pub mod session_store;
pub mod types;

pub use client::ApiClient;
pub use session_store::{SessionStore, StoredSession};
pub use types::*;

use crate::error::Result;
use async_trait::async_trait;
use cev_common::types::{DatasetDetail, DatasetId, DatasetStatistics, DatasetSummary, User};

#[async_trait]
pub trait DatasetApi: Send + Sync {
    async fn register(&self, profile: &RegisterRequest) -> Result<RegisterResponse>;

    async fn login(&self, credentials: &LoginRequest) -> Result<User>;

    async fn logout(&self) -> Result<()>;

    /// Identity check: the user owning the current session.
    async fn current_user(&self) -> Result<User>;

    /// Datasets of the current user, already normalized from either list shape.
    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>>;

    /// `Ok(None)` when the server answers successfully with an empty body.
    async fn get_dataset(&self, id: DatasetId) -> Result<Option<DatasetDetail>>;

    async fn get_dataset_summary(&self, id: DatasetId) -> Result<DatasetStatistics>;

    /// Returns the dataset the server created from the upload.
    async fn upload_dataset(&self, payload: UploadPayload) -> Result<DatasetSummary>;

    async fn get_report(&self, id: DatasetId) -> Result<ReportArtifact>;

    async fn delete_dataset(&self, id: DatasetId) -> Result<()>;
}

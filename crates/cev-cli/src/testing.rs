//! In-memory [`DatasetApi`] for unit tests

use crate::api::{
    DatasetApi, LoginRequest, RegisterRequest, RegisterResponse, ReportArtifact, UploadPayload,
};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use cev_common::types::{
    DatasetDetail, DatasetId, DatasetStatistics, DatasetSummary, Equipment, User,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Status and optional server message of a canned rejection.
pub type Rejection = (u16, Option<&'static str>);

fn reject(rejection: Rejection) -> CliError {
    CliError::rejected(rejection.0, rejection.1.map(str::to_string))
}

#[derive(Default)]
pub struct FakeApi {
    /// Identity check answer; `None` answers 401
    pub user: Option<User>,
    pub login_error: Option<Rejection>,
    pub register_error: Option<Rejection>,
    pub logout_error: Option<Rejection>,
    pub datasets: Vec<DatasetSummary>,
    pub list_error: Option<Rejection>,
    pub detail: Option<DatasetDetail>,
    pub detail_error: Option<Rejection>,
    pub statistics: Option<DatasetStatistics>,
    pub upload_error: Option<Rejection>,
    pub upload_id: i64,
    pub report_error: Option<Rejection>,
    pub report_delay: Duration,
    pub calls: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub uploads: Mutex<Vec<UploadPayload>>,
}

impl FakeApi {
    fn record(&self, call: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.into());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn uploads(&self) -> Vec<UploadPayload> {
        self.uploads.lock().map(|u| u.clone()).unwrap_or_default()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetApi for FakeApi {
    async fn register(&self, profile: &RegisterRequest) -> Result<RegisterResponse> {
        self.record("register");
        if let Some(rejection) = self.register_error {
            return Err(reject(rejection));
        }
        Ok(RegisterResponse {
            message: Some("User registered successfully".to_string()),
            user: Some(sample_user(&profile.username)),
        })
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<User> {
        self.record("login");
        if let Some(rejection) = self.login_error {
            return Err(reject(rejection));
        }
        Ok(sample_user(&credentials.username))
    }

    async fn logout(&self) -> Result<()> {
        self.record("logout");
        match self.logout_error {
            Some(rejection) => Err(reject(rejection)),
            None => Ok(()),
        }
    }

    async fn current_user(&self) -> Result<User> {
        self.record("current_user");
        self.user
            .clone()
            .ok_or_else(|| CliError::rejected(401, Some("Not authenticated".to_string())))
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        self.record("list_datasets");
        if let Some(rejection) = self.list_error {
            return Err(reject(rejection));
        }
        Ok(self.datasets.clone())
    }

    async fn get_dataset(&self, id: DatasetId) -> Result<Option<DatasetDetail>> {
        self.record(format!("get_dataset:{}", id));
        if let Some(rejection) = self.detail_error {
            return Err(reject(rejection));
        }
        Ok(self.detail.clone())
    }

    async fn get_dataset_summary(&self, id: DatasetId) -> Result<DatasetStatistics> {
        self.record(format!("get_dataset_summary:{}", id));
        self.statistics
            .clone()
            .ok_or_else(|| CliError::rejected(404, None))
    }

    async fn upload_dataset(&self, payload: UploadPayload) -> Result<DatasetSummary> {
        self.record("upload_dataset");
        if let Ok(mut uploads) = self.uploads.lock() {
            uploads.push(payload.clone());
        }
        if let Some(rejection) = self.upload_error {
            return Err(reject(rejection));
        }
        Ok(sample_summary(self.upload_id, &payload.name))
    }

    async fn get_report(&self, id: DatasetId) -> Result<ReportArtifact> {
        self.record(format!("get_report:{}", id));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.report_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(rejection) = self.report_error {
            return Err(reject(rejection));
        }
        Ok(ReportArtifact {
            dataset_id: id,
            bytes: b"%PDF-1.4\n".to_vec(),
            content_type: Some("application/pdf".to_string()),
        })
    }

    async fn delete_dataset(&self, id: DatasetId) -> Result<()> {
        self.record(format!("delete_dataset:{}", id));
        Ok(())
    }
}

pub fn sample_user(username: &str) -> User {
    User {
        id: 1,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: String::new(),
        last_name: String::new(),
    }
}

pub fn sample_summary(id: i64, name: &str) -> DatasetSummary {
    DatasetSummary {
        id: DatasetId(id),
        name: name.to_string(),
        uploaded_at: "2024-03-01T09:30:00Z".to_string(),
        total_count: 2,
        avg_flowrate: Some(120.0),
        avg_pressure: Some(5.5),
        avg_temperature: Some(80.4),
        equipment_count: None,
    }
}

pub fn sample_equipment(id: i64, name: &str, equipment_type: &str) -> Equipment {
    Equipment {
        id,
        equipment_name: name.to_string(),
        equipment_type: equipment_type.to_string(),
        flowrate: 100.0 + id as f64,
        pressure: 5.0,
        temperature: 80.5,
    }
}

pub fn sample_detail(id: i64, equipment: Vec<Equipment>) -> DatasetDetail {
    let mut equipment_types = BTreeMap::new();
    for record in &equipment {
        *equipment_types.entry(record.equipment_type.clone()).or_insert(0) += 1;
    }
    let mut summary = sample_summary(id, "Plant North");
    summary.total_count = equipment.len() as u64;

    DatasetDetail {
        summary,
        equipment_types,
        equipment,
    }
}

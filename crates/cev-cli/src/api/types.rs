//! API request and response types
//!
//! Wire shapes of the backend endpoints. Domain payloads (users, datasets,
//! equipment) live in `cev_common::types`; this module only adds the
//! envelopes around them.

use cev_common::types::{DatasetId, DatasetSummary, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST auth/register/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Credentials for the automatic login that follows registration.
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Body of `POST auth/login/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// `GET datasets/` answers either a bare array or a paginated envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DatasetList {
    Bare(Vec<DatasetSummary>),
    Enveloped { results: Vec<DatasetSummary> },
}

impl DatasetList {
    pub fn into_vec(self) -> Vec<DatasetSummary> {
        match self {
            DatasetList::Bare(datasets) => datasets,
            DatasetList::Enveloped { results } => results,
        }
    }
}

/// Multipart body of `POST datasets/upload/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub contents: Vec<u8>,
    /// Display name sent as the `name` form field
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub dataset: DatasetSummary,
}

/// Raw bytes of a generated report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub dataset_id: DatasetId,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Pull a user-facing message out of an error body.
///
/// Looks at `error`, then `detail`, then `non_field_errors`, then the first
/// field error (`field: message`).
pub fn server_message(body: &Value) -> Option<String> {
    let obj = body.as_object()?;

    for key in ["error", "detail"] {
        if let Some(msg) = obj.get(key).and_then(first_text) {
            return Some(msg);
        }
    }

    if let Some(msg) = obj.get("non_field_errors").and_then(first_text) {
        return Some(msg);
    }

    obj.iter()
        .find_map(|(field, value)| first_text(value).map(|msg| format!("{}: {}", field, msg)))
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

//! Data contracts shared between the client and the backend
//!
//! Every type here is read-only on the client: datasets and equipment are
//! created server-side and only ever replaced by a full re-fetch.

use crate::error::{CevError, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// ============================================================================
// Identity
// ============================================================================

/// An authenticated account as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl User {
    /// Full name when one was given at registration, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// ============================================================================
// Datasets
// ============================================================================

/// Server-assigned dataset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub i64);

impl std::fmt::Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetId {
    type Err = CevError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(DatasetId)
            .map_err(|_| CevError::Parse(format!("'{}' is not a valid dataset id", s)))
    }
}

/// Dataset as it appears in the dataset list.
///
/// Averages may be absent or `null` for datasets without records; use the
/// accessor methods, which report zero in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub name: String,
    pub uploaded_at: String,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub avg_flowrate: Option<f64>,
    #[serde(default)]
    pub avg_pressure: Option<f64>,
    #[serde(default)]
    pub avg_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_count: Option<u64>,
}

impl DatasetSummary {
    pub fn avg_flowrate(&self) -> f64 {
        self.average(self.avg_flowrate)
    }

    pub fn avg_pressure(&self) -> f64 {
        self.average(self.avg_pressure)
    }

    pub fn avg_temperature(&self) -> f64 {
        self.average(self.avg_temperature)
    }

    fn average(&self, value: Option<f64>) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Upload time converted to the local timezone.
    pub fn uploaded_at_local(&self) -> Result<DateTime<Local>> {
        parse_timestamp(&self.uploaded_at)
    }

    /// Upload time for display; falls back to the raw server string.
    pub fn uploaded_at_display(&self) -> String {
        self.uploaded_at_local()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| self.uploaded_at.clone())
    }
}

/// Dataset with its type distribution and every equipment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDetail {
    #[serde(flatten)]
    pub summary: DatasetSummary,
    /// Equipment type label -> number of records with that type
    #[serde(default)]
    pub equipment_types: BTreeMap<String, u64>,
    /// Records in server order
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

/// One row of the uploaded CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: i64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

// ============================================================================
// Summary statistics
// ============================================================================

/// Payload of the per-dataset summary endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub dataset_id: DatasetId,
    pub dataset_name: String,
    pub uploaded_at: String,
    pub total_count: u64,
    pub statistics: ParameterStatistics,
    #[serde(default)]
    pub type_distribution: Vec<TypeShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStatistics {
    pub flowrate: ParameterRange,
    pub pressure: ParameterRange,
    pub temperature: ParameterRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub count: u64,
    pub percentage: f64,
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 values and offset-less ISO 8601 values, which the backend
/// emits when timezone support is disabled; the latter are read as local time.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Local>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Local));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .ok_or_else(|| CevError::InvalidTimestamp(raw.to_string()))
}

//! Versioned plan records.
//!
//! Storing plans is the caller's business; this module only defines the
//! record and how older encodings are upgraded. Each encoding carries an
//! explicit `version` tag and every version step has its own upgrade
//! function. Records written before versioning (no tag) are version 0.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Stop;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unsupported plan version {0}")]
    UnsupportedVersion(u64),
}

/// A saved route plan (schema v1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub city: String,
    pub origin: Stop,
    pub return_to_start: bool,
    pub stops: Vec<Stop>,
    pub total_distance_meters: f64,
    pub total_duration_sec: f64,
}

/// Summary row for listing saved plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanIndexEntry {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub city: String,
    pub stops_count: usize,
    pub total_distance_meters: f64,
    pub total_duration_sec: f64,
    pub version: u32,
}

/// Legacy unversioned record: descriptive fields may be missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanV0 {
    id: String,
    name: Option<String>,
    created_at: Option<DateTime<Utc>>,
    city: Option<String>,
    origin: Stop,
    #[serde(default = "default_return_to_start")]
    return_to_start: bool,
    #[serde(default)]
    stops: Vec<Stop>,
    #[serde(default)]
    total_distance_meters: f64,
    #[serde(default)]
    total_duration_sec: f64,
}

fn default_return_to_start() -> bool {
    true
}

#[derive(Serialize)]
struct Tagged<'a> {
    version: u32,
    #[serde(flatten)]
    plan: &'a Plan,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: Option<u64>,
}

fn upgrade_v0(old: PlanV0) -> Plan {
    Plan {
        id: old.id,
        name: old.name.unwrap_or_else(|| "Untitled Plan".to_string()),
        created_at: old.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        city: old.city.unwrap_or_else(|| "Unknown".to_string()),
        origin: old.origin,
        return_to_start: old.return_to_start,
        stops: old.stops,
        total_distance_meters: old.total_distance_meters,
        total_duration_sec: old.total_duration_sec,
    }
}

/// Decode a stored plan of any known version into the current schema.
pub fn decode_plan(json: &str) -> Result<Plan, PlanError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let probe = VersionProbe::deserialize(&value)?;

    match probe.version {
        None | Some(0) => {
            tracing::debug!("upgrading unversioned plan record");
            Ok(upgrade_v0(PlanV0::deserialize(&value)?))
        }
        Some(1) => Ok(Plan::deserialize(&value)?),
        Some(other) => Err(PlanError::UnsupportedVersion(other)),
    }
}

/// Encode a plan tagged with [`CURRENT_VERSION`].
pub fn encode_plan(plan: &Plan) -> Result<String, PlanError> {
    Ok(serde_json::to_string(&Tagged {
        version: CURRENT_VERSION,
        plan,
    })?)
}

impl Plan {
    pub fn index_entry(&self) -> PlanIndexEntry {
        PlanIndexEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            city: self.city.clone(),
            stops_count: self.stops.len(),
            total_distance_meters: self.total_distance_meters,
            total_duration_sec: self.total_duration_sec,
            version: CURRENT_VERSION,
        }
    }

    /// Copy under a new id, named `"<name> (Copy)"`.
    pub fn duplicate(&self, new_id: impl Into<String>, now: DateTime<Utc>) -> Plan {
        Plan {
            id: new_id.into(),
            name: format!("{} (Copy)", self.name),
            created_at: now,
            ..self.clone()
        }
    }
}

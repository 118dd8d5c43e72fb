//! Incident report model.
//!
//! Incident `type` and `priority` are free-form classification strings set
//! by the reporting layer; the workflow `status` starts at `"pending"` and
//! moves through caller-defined states such as `"investigating"` and
//! `"resolved"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workflow status every new incident starts in.
pub const STATUS_PENDING: &str = "pending";
/// Workflow status counted as resolved by the statistics.
pub const STATUS_RESOLVED: &str = "resolved";

/// Persisted incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: u64,
    /// Classification, e.g. "violence", "technical", "irregularity".
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub state: String,
    pub district: String,
    pub polling_station: String,
    pub description: String,
    pub status: String,
    /// Identity of the reporting user, as provided by the caller.
    pub reported_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for filing an incident. `status` is not accepted here; creation
/// always starts at [`STATUS_PENDING`].
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub kind: String,
    pub priority: String,
    pub state: String,
    pub district: String,
    pub polling_station: String,
    pub description: String,
    pub reported_by: String,
}

/// Aggregate incident statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub by_type: BTreeMap<String, u64>,
    /// Incidents created since local midnight.
    pub today: u64,
    /// Incidents with status `"resolved"` updated since local midnight.
    pub resolved_today: u64,
}

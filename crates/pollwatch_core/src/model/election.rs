//! Election data model: the `electionData` singleton document.
//!
//! Unlike the other collections this is one JSON object holding national
//! aggregate totals plus an ordered list of per-state records.

use serde::{Deserialize, Serialize};

/// Alert level for a state's election figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateStatus {
    Normal,
    Alert,
    Critical,
}

/// National aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationalSummary {
    pub total_voters: u64,
    pub polling_stations: u64,
    pub constituencies: u64,
    /// Turnout percentage, mean of the per-state figures.
    pub current_turnout: f64,
    pub incidents_reported: u64,
    pub incidents_resolved: u64,
    pub last_updated: String,
}

/// Election figures for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub name: String,
    pub total_voters: u64,
    pub polling_stations: u64,
    /// Turnout percentage for this state.
    pub current_turnout: f64,
    pub incidents: u64,
    pub status: StateStatus,
    pub last_updated: String,
}

/// The whole singleton document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionData {
    pub national: NationalSummary,
    /// Ordered: tie-breaks in the dashboard summary are resolved by the
    /// leftmost element.
    pub states: Vec<StateRecord>,
}

/// Dashboard view: national + states + derived summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub national: NationalSummary,
    pub states: Vec<StateRecord>,
    pub summary: DashboardSummary,
}

/// Derived extremes over the state list. Ties go to the first occurrence in
/// stored order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub highest_turnout: StateRecord,
    pub lowest_turnout: StateRecord,
    pub most_incidents: StateRecord,
    pub total_states: u64,
}

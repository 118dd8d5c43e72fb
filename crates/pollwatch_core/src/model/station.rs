//! Polling station model.
//!
//! # Invariants
//! - `code` is unique across the collection.
//! - `current_voters` is expected to stay at or below `total_voters`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operational status of a polling station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Active,
    Inactive,
}

/// Geographic coordinates of a station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Persisted polling station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingStation {
    pub id: u64,
    /// Unique station code, e.g. `PS-KER-17`.
    pub code: String,
    pub name: String,
    pub state: String,
    pub district: String,
    pub location: GeoPoint,
    pub total_voters: u64,
    pub current_voters: u64,
    pub status: StationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Aggregate statistics over all polling stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub by_state: BTreeMap<String, u64>,
    pub total_voters: u64,
    pub current_voters: u64,
    /// Σ currentVoters / max(Σ totalVoters, 1) × 100. An empty collection
    /// therefore reads as 0.0 rather than an error.
    pub overall_turnout: f64,
}

/// Aggregate statistics for the stations of one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStationStats {
    pub total: u64,
    pub active: u64,
    pub total_voters: u64,
    pub current_voters: u64,
    pub turnout: f64,
}

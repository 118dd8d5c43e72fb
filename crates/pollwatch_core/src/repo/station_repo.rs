//! Polling station repository: lookups, voter-count updates, turnout stats.

use super::{from_doc, from_docs, RepoResult};
use crate::model::station::{PollingStation, StationStats, StationStatus, StateStationStats};
use crate::store::{Document, JsonStore};
use serde_json::Value;
use std::collections::BTreeMap;

const COLLECTION: &str = "pollingStations";

/// Typed façade over the `pollingStations` collection.
pub struct PollingStationRepository<'store> {
    store: &'store JsonStore,
}

impl<'store> PollingStationRepository<'store> {
    pub fn new(store: &'store JsonStore) -> Self {
        Self { store }
    }

    pub fn find_all(&self, query: &Document) -> RepoResult<Vec<PollingStation>> {
        from_docs(self.store.find(COLLECTION, query)?)
    }

    pub fn find_by_id(&self, id: u64) -> RepoResult<Option<PollingStation>> {
        let mut query = Document::new();
        query.insert("id".into(), Value::from(id));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    pub fn find_by_code(&self, code: &str) -> RepoResult<Option<PollingStation>> {
        let mut query = Document::new();
        query.insert("code".into(), Value::from(code));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    pub fn update(&self, id: u64, fields: Document) -> RepoResult<Option<PollingStation>> {
        self.store.update(COLLECTION, id, fields)?.map(from_doc).transpose()
    }

    /// Records the running voter count for one station.
    pub fn update_voter_count(&self, id: u64, count: u64) -> RepoResult<Option<PollingStation>> {
        let mut fields = Document::new();
        fields.insert("currentVoters".into(), Value::from(count));
        self.update(id, fields)
    }

    /// Overall totals and turnout across every station.
    ///
    /// Turnout is Σ currentVoters / max(Σ totalVoters, 1) × 100; the
    /// denominator floor means an empty collection reads as 0.0 turnout
    /// rather than a division error.
    pub fn stats(&self) -> RepoResult<StationStats> {
        let stations = self.find_all(&Document::new())?;

        let mut by_state: BTreeMap<String, u64> = BTreeMap::new();
        let mut active = 0;
        let mut inactive = 0;
        for station in &stations {
            *by_state.entry(station.state.clone()).or_default() += 1;
            match station.status {
                StationStatus::Active => active += 1,
                StationStatus::Inactive => inactive += 1,
            }
        }

        let total_voters: u64 = stations.iter().map(|s| s.total_voters).sum();
        let current_voters: u64 = stations.iter().map(|s| s.current_voters).sum();

        Ok(StationStats {
            total: stations.len() as u64,
            active,
            inactive,
            by_state,
            total_voters,
            current_voters,
            overall_turnout: turnout_percent(current_voters, total_voters),
        })
    }

    /// Totals and turnout restricted to one state's stations.
    pub fn state_stats(&self, state: &str) -> RepoResult<StateStationStats> {
        let mut query = Document::new();
        query.insert("state".into(), Value::from(state));
        let stations = self.find_all(&query)?;

        let active = stations
            .iter()
            .filter(|s| s.status == StationStatus::Active)
            .count() as u64;
        let total_voters: u64 = stations.iter().map(|s| s.total_voters).sum();
        let current_voters: u64 = stations.iter().map(|s| s.current_voters).sum();

        Ok(StateStationStats {
            total: stations.len() as u64,
            active,
            total_voters,
            current_voters,
            turnout: turnout_percent(current_voters, total_voters),
        })
    }
}

fn turnout_percent(current: u64, total: u64) -> f64 {
    current as f64 / total.max(1) as f64 * 100.0
}

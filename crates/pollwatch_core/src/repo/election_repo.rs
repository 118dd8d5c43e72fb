//! Election data repository: the national/state singleton and the derived
//! dashboard view.
//!
//! # Invariants
//! - Updates re-stamp `lastUpdated` on the record they touch and rewrite the
//!   whole singleton under its collection lock.
//! - Dashboard extremes scan states left to right with strict comparisons,
//!   so the first occurrence in stored order wins ties.

use super::{RepoError, RepoResult};
use crate::model::election::{
    DashboardStats, DashboardSummary, ElectionData, NationalSummary, StateRecord,
};
use crate::store::{json_store::now_rfc3339, Document, JsonStore};
use serde_json::Value;

const COLLECTION: &str = "electionData";

/// Typed façade over the `electionData` singleton.
pub struct ElectionDataRepository<'store> {
    store: &'store JsonStore,
}

impl<'store> ElectionDataRepository<'store> {
    pub fn new(store: &'store JsonStore) -> Self {
        Self { store }
    }

    /// The whole singleton. `NotFound` when it has never been seeded.
    pub fn load(&self) -> RepoResult<ElectionData> {
        let value = self.store.read_value(COLLECTION)?.ok_or(RepoError::NotFound)?;
        deserialize(value)
    }

    pub fn national(&self) -> RepoResult<NationalSummary> {
        Ok(self.load()?.national)
    }

    pub fn states(&self) -> RepoResult<Vec<StateRecord>> {
        Ok(self.load()?.states)
    }

    pub fn state_by_name(&self, name: &str) -> RepoResult<Option<StateRecord>> {
        Ok(self.load()?.states.into_iter().find(|s| s.name == name))
    }

    /// Shallow-merges `fields` over the national record and re-stamps its
    /// `lastUpdated`.
    pub fn update_national(&self, fields: Document) -> RepoResult<NationalSummary> {
        self.store.modify_value(COLLECTION, |current| {
            let mut data: ElectionData =
                deserialize(current.ok_or(RepoError::NotFound)?)?;
            let merged = merge_fields(
                serde_json::to_value(&data.national)
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?,
                fields,
            )?;
            data.national = serde_json::from_value(merged)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;

            let value = serde_json::to_value(&data)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            Ok((value, data.national))
        })
    }

    /// Shallow-merges `fields` over the state named `name`. `Ok(None)` when
    /// no such state exists.
    pub fn update_state(
        &self,
        name: &str,
        fields: Document,
    ) -> RepoResult<Option<StateRecord>> {
        self.store.modify_value(COLLECTION, |current| {
            let mut data: ElectionData =
                deserialize(current.ok_or(RepoError::NotFound)?)?;
            let Some(index) = data.states.iter().position(|s| s.name == name) else {
                let unchanged = serde_json::to_value(&data)
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?;
                return Ok((unchanged, None));
            };

            let merged = merge_fields(
                serde_json::to_value(&data.states[index])
                    .map_err(|err| RepoError::InvalidData(err.to_string()))?,
                fields,
            )?;
            data.states[index] = serde_json::from_value(merged)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;

            let updated = data.states[index].clone();
            let value = serde_json::to_value(&data)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            Ok((value, Some(updated)))
        })
    }

    /// National + states + derived extremes. `NotFound` when the singleton
    /// is missing or holds no states.
    pub fn dashboard(&self) -> RepoResult<DashboardStats> {
        let data = self.load()?;
        if data.states.is_empty() {
            return Err(RepoError::NotFound);
        }

        let highest_turnout = leftmost_max_by(&data.states, |s| s.current_turnout);
        let lowest_turnout = leftmost_min_by(&data.states, |s| s.current_turnout);
        let most_incidents = leftmost_max_by(&data.states, |s| s.incidents as f64);
        let total_states = data.states.len() as u64;

        Ok(DashboardStats {
            national: data.national,
            states: data.states.clone(),
            summary: DashboardSummary {
                highest_turnout,
                lowest_turnout,
                most_incidents,
                total_states,
            },
        })
    }
}

fn deserialize(value: Value) -> RepoResult<ElectionData> {
    serde_json::from_value(value).map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// Shallow merge of `fields` over a serialized record, with a fresh
/// `lastUpdated` stamp.
fn merge_fields(base: Value, fields: Document) -> RepoResult<Value> {
    let Value::Object(mut map) = base else {
        return Err(RepoError::InvalidData(
            "election record is not a JSON object".to_string(),
        ));
    };
    for (key, value) in fields {
        map.insert(key, value);
    }
    map.insert("lastUpdated".to_string(), Value::from(now_rfc3339()));
    Ok(Value::Object(map))
}

/// Leftmost element maximizing `key`: later elements replace the running
/// best only on a strictly greater key.
fn leftmost_max_by(states: &[StateRecord], key: impl Fn(&StateRecord) -> f64) -> StateRecord {
    states
        .iter()
        .skip(1)
        .fold(states[0].clone(), |best, state| {
            if key(state) > key(&best) {
                state.clone()
            } else {
                best
            }
        })
}

/// Leftmost element minimizing `key`; mirror of [`leftmost_max_by`].
fn leftmost_min_by(states: &[StateRecord], key: impl Fn(&StateRecord) -> f64) -> StateRecord {
    states
        .iter()
        .skip(1)
        .fold(states[0].clone(), |best, state| {
            if key(state) < key(&best) {
                state.clone()
            } else {
                best
            }
        })
}

//! Incident repository: filing, workflow updates, incident statistics.

use super::{from_doc, from_docs, parse_timestamp, RepoResult};
use crate::model::incident::{Incident, IncidentStats, NewIncident, STATUS_PENDING, STATUS_RESOLVED};
use crate::store::{Document, JsonStore};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

const COLLECTION: &str = "incidents";

/// Typed façade over the `incidents` collection.
pub struct IncidentRepository<'store> {
    store: &'store JsonStore,
}

impl<'store> IncidentRepository<'store> {
    pub fn new(store: &'store JsonStore) -> Self {
        Self { store }
    }

    /// Files an incident. The workflow status always starts at `"pending"`,
    /// whatever the caller intended.
    pub fn create(&self, new_incident: NewIncident) -> RepoResult<Incident> {
        let mut fields = Document::new();
        fields.insert("type".into(), Value::from(new_incident.kind));
        fields.insert("priority".into(), Value::from(new_incident.priority));
        fields.insert("state".into(), Value::from(new_incident.state));
        fields.insert("district".into(), Value::from(new_incident.district));
        fields.insert(
            "pollingStation".into(),
            Value::from(new_incident.polling_station),
        );
        fields.insert("description".into(), Value::from(new_incident.description));
        fields.insert("status".into(), Value::from(STATUS_PENDING));
        fields.insert("reportedBy".into(), Value::from(new_incident.reported_by));

        let incident: Incident = from_doc(self.store.create(COLLECTION, fields)?)?;
        debug!(
            "event=incident_create module=repo status=ok id={} priority={}",
            incident.id, incident.priority
        );
        Ok(incident)
    }

    pub fn find_by_id(&self, id: u64) -> RepoResult<Option<Incident>> {
        let mut query = Document::new();
        query.insert("id".into(), Value::from(id));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    /// All incidents matching the exact-equality `query`; an empty query
    /// returns the whole collection.
    pub fn find_all(&self, query: &Document) -> RepoResult<Vec<Incident>> {
        from_docs(self.store.find(COLLECTION, query)?)
    }

    pub fn by_state(&self, state: &str) -> RepoResult<Vec<Incident>> {
        let mut query = Document::new();
        query.insert("state".into(), Value::from(state));
        self.find_all(&query)
    }

    /// Shallow update (status transitions, reassignment). `Ok(None)` when
    /// the id is absent.
    pub fn update(&self, id: u64, fields: Document) -> RepoResult<Option<Incident>> {
        self.store.update(COLLECTION, id, fields)?.map(from_doc).transpose()
    }

    pub fn delete(&self, id: u64) -> RepoResult<bool> {
        Ok(self.store.delete(COLLECTION, id)?)
    }

    /// Totals plus status/priority/type breakdowns, and today's counters
    /// measured from local midnight.
    pub fn stats(&self) -> RepoResult<IncidentStats> {
        let incidents = self.find_all(&Document::new())?;
        let today = Local::now().date_naive();

        let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_priority: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut created_today = 0;
        let mut resolved_today = 0;

        for incident in &incidents {
            *by_status.entry(incident.status.clone()).or_default() += 1;
            *by_priority.entry(incident.priority.clone()).or_default() += 1;
            *by_type.entry(incident.kind.clone()).or_default() += 1;

            if is_on_or_after_local_day(&incident.created_at, today) {
                created_today += 1;
            }
            if incident.status == STATUS_RESOLVED
                && is_on_or_after_local_day(&incident.updated_at, today)
            {
                resolved_today += 1;
            }
        }

        Ok(IncidentStats {
            total: incidents.len() as u64,
            by_status,
            by_priority,
            by_type,
            today: created_today,
            resolved_today,
        })
    }

    /// Most recent incidents first (by `createdAt`), truncated to `limit`.
    /// The sort is stable, so records with equal timestamps keep stored
    /// order.
    pub fn recent(&self, limit: usize) -> RepoResult<Vec<Incident>> {
        let mut incidents = self.find_all(&Document::new())?;
        incidents.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
        incidents.truncate(limit);
        Ok(incidents)
    }
}

fn sort_key(incident: &Incident) -> Option<DateTime<FixedOffset>> {
    parse_timestamp(&incident.created_at)
}

/// Whether a stored timestamp falls on `day` or later, in local time.
/// Unparsable timestamps count as not-today.
fn is_on_or_after_local_day(timestamp: &str, day: NaiveDate) -> bool {
    parse_timestamp(timestamp)
        .map(|at| at.with_timezone(&Local).date_naive() >= day)
        .unwrap_or(false)
}

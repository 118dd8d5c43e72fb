//! First-run seed data.
//!
//! # Responsibility
//! - Detect a fresh installation (data directory absent) and populate the
//!   default admin account, polling stations and election figures.
//!
//! # Invariants
//! - Seeding runs at most once per data directory; an existing directory is
//!   never re-seeded or overwritten.
//! - All randomness flows through the caller-provided RNG, so tests seed it
//!   for reproducible fixtures.

use crate::model::election::{ElectionData, NationalSummary, StateRecord, StateStatus};
use crate::model::station::{GeoPoint, PollingStation, StationStatus};
use crate::model::user::{NewUser, Role};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::store::json_store::now_rfc3339;
use crate::store::{Document, JsonStore, StoreConfig};
use log::info;
use rand::Rng;
use serde_json::Value;
use std::collections::HashSet;

/// Default admin credential. Well-known and demo-only: any real deployment
/// must change it immediately after first login.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@eci.gov.in";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const INDIAN_STATES: [&str; 28] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
];

/// Opens the store, seeding default data first when the data directory did
/// not yet exist.
pub fn ensure_seeded(
    config: &StoreConfig,
    rng: &mut impl Rng,
    hash_cost: u32,
) -> RepoResult<JsonStore> {
    let first_run = !config.is_initialized();
    let store = JsonStore::open(config)?;
    if first_run {
        seed_defaults(&store, rng, hash_cost)?;
    }
    Ok(store)
}

/// Writes the default data set into an empty store: one admin account, an
/// empty incident collection, synthetic polling stations and synthetic
/// election figures.
pub fn seed_defaults(
    store: &JsonStore,
    rng: &mut impl Rng,
    hash_cost: u32,
) -> RepoResult<()> {
    let users = UserRepository::with_hash_cost(store, hash_cost);
    users.create(NewUser {
        first_name: "System".to_string(),
        last_name: "Administrator".to_string(),
        username: Some(DEFAULT_ADMIN_USERNAME.to_string()),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password: DEFAULT_ADMIN_PASSWORD.to_string(),
        role: Some(Role::Admin),
        organization: "Election Commission of India".to_string(),
        phone: "+911234567890".to_string(),
    })?;

    store.write_collection("incidents", &[])?;

    let stations = generate_stations(rng)?;
    store.write_collection("pollingStations", &stations)?;

    let election = generate_election_data(rng);
    let value =
        serde_json::to_value(&election).map_err(|err| RepoError::InvalidData(err.to_string()))?;
    store.write_value("electionData", &value)?;

    info!(
        "event=seed module=seed status=ok stations={} states={}",
        stations.len(),
        election.states.len()
    );
    Ok(())
}

/// 50–149 stations per state, all at zero turnout and active.
fn generate_stations(rng: &mut impl Rng) -> RepoResult<Vec<Document>> {
    let now = now_rfc3339();
    let mut stations = Vec::new();
    let mut id = 1;

    let mut used_codes = HashSet::new();
    for state in INDIAN_STATES {
        let prefix = state_code(state, &mut used_codes);
        let count = rng.gen_range(50..150);
        for i in 0..count {
            let station = PollingStation {
                id,
                code: format!("PS-{}-{}", prefix, i + 1),
                name: format!("Polling Station {}", i + 1),
                state: state.to_string(),
                district: format!("{} District {}", state, i / 10 + 1),
                location: GeoPoint {
                    latitude: rng.gen_range(20.0..30.0),
                    longitude: rng.gen_range(70.0..80.0),
                },
                total_voters: rng.gen_range(500..1500),
                current_voters: 0,
                status: StationStatus::Active,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            id += 1;

            let value = serde_json::to_value(&station)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            match value {
                Value::Object(doc) => stations.push(doc),
                _ => unreachable!("a struct serializes to a JSON object"),
            }
        }
    }

    Ok(stations)
}

/// Per-state election figures plus aggregated national totals.
fn generate_election_data(rng: &mut impl Rng) -> ElectionData {
    let now = now_rfc3339();
    let states: Vec<StateRecord> = INDIAN_STATES
        .iter()
        .map(|state| StateRecord {
            name: state.to_string(),
            total_voters: rng.gen_range(1_000_000..6_000_000),
            polling_stations: rng.gen_range(10_000..60_000),
            current_turnout: rng.gen_range(20..90) as f64,
            incidents: rng.gen_range(0..50),
            status: match rng.gen_range(0..3) {
                0 => StateStatus::Normal,
                1 => StateStatus::Alert,
                _ => StateStatus::Critical,
            },
            last_updated: now.clone(),
        })
        .collect();

    let total_voters: u64 = states.iter().map(|s| s.total_voters).sum();
    let polling_stations: u64 = states.iter().map(|s| s.polling_stations).sum();
    let incidents_reported: u64 = states.iter().map(|s| s.incidents).sum();
    let turnout_sum: f64 = states.iter().map(|s| s.current_turnout).sum();

    ElectionData {
        national: NationalSummary {
            total_voters,
            polling_stations,
            constituencies: 2600,
            current_turnout: turnout_sum / states.len() as f64,
            incidents_reported,
            incidents_resolved: incidents_reported * 7 / 10,
            last_updated: now,
        },
        states,
    }
}

/// Uppercase code derived from the state name, unique within `used`.
///
/// Starts from the first three letters and extends one letter at a time
/// while the prefix is taken, so "Uttar Pradesh" and "Uttarakhand" get
/// distinct codes. Station codes built from these stay unique across the
/// whole seed.
fn state_code(state: &str, used: &mut HashSet<String>) -> String {
    let letters: String = state
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();

    let mut end = letters.len().min(3);
    let mut code = letters[..end].to_string();
    while used.contains(&code) && end < letters.len() {
        end += 1;
        code = letters[..end].to_string();
    }
    let mut n = 2;
    while !used.insert(code.clone()) {
        code = format!("{}{}", &letters[..end], n);
        n += 1;
    }
    code
}

#[cfg(test)]
mod tests {
    use super::state_code;
    use std::collections::HashSet;

    #[test]
    fn state_code_is_first_three_letters_uppercased() {
        let mut used = HashSet::new();
        assert_eq!(state_code("Kerala", &mut used), "KER");
        assert_eq!(state_code("Goa", &mut used), "GOA");
    }

    #[test]
    fn shared_prefixes_extend_until_distinct() {
        let mut used = HashSet::new();
        assert_eq!(state_code("Uttar Pradesh", &mut used), "UTT");
        assert_eq!(state_code("Uttarakhand", &mut used), "UTTA");
    }

    #[test]
    fn identical_names_fall_back_to_a_numeric_suffix() {
        let mut used = HashSet::new();
        assert_eq!(state_code("Goa", &mut used), "GOA");
        assert_eq!(state_code("Goa", &mut used), "GOA2");
        assert_eq!(state_code("Goa", &mut used), "GOA3");
    }
}

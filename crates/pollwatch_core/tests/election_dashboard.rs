use pollwatch_core::{Document, ElectionDataRepository, JsonStore, RepoError, StoreConfig};
use serde_json::{json, Value};
use tempfile::TempDir;

fn temp_store() -> (TempDir, JsonStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonStore::open(&StoreConfig::new(dir.path().join("data"))).expect("open store");
    (dir, store)
}

fn state(name: &str, turnout: f64, incidents: u64) -> Value {
    json!({
        "name": name,
        "totalVoters": 2_000_000u64,
        "pollingStations": 15_000u64,
        "currentTurnout": turnout,
        "incidents": incidents,
        "status": "normal",
        "lastUpdated": "2026-08-01T06:00:00.000Z",
    })
}

fn seed_singleton(store: &JsonStore, states: Vec<Value>) {
    let value = json!({
        "national": {
            "totalVoters": 10_000_000u64,
            "pollingStations": 80_000u64,
            "constituencies": 2600u64,
            "currentTurnout": 45.0,
            "incidentsReported": 120u64,
            "incidentsResolved": 84u64,
            "lastUpdated": "2026-08-01T06:00:00.000Z",
        },
        "states": states,
    });
    store.write_value("electionData", &value).unwrap();
}

#[test]
fn national_and_states_read_back() {
    let (_dir, store) = temp_store();
    seed_singleton(
        &store,
        vec![state("Kerala", 61.0, 4), state("Goa", 55.0, 2)],
    );

    let repo = ElectionDataRepository::new(&store);
    let national = repo.national().unwrap();
    assert_eq!(national.total_voters, 10_000_000);
    assert_eq!(national.constituencies, 2600);

    let states = repo.states().unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].name, "Kerala");

    let goa = repo.state_by_name("Goa").unwrap().unwrap();
    assert_eq!(goa.current_turnout, 55.0);
    assert!(repo.state_by_name("Atlantis").unwrap().is_none());
}

#[test]
fn missing_singleton_is_not_found() {
    let (_dir, store) = temp_store();
    let repo = ElectionDataRepository::new(&store);
    assert!(matches!(repo.national().unwrap_err(), RepoError::NotFound));
    assert!(matches!(repo.dashboard().unwrap_err(), RepoError::NotFound));
}

#[test]
fn update_national_merges_and_restamps() {
    let (_dir, store) = temp_store();
    seed_singleton(&store, vec![state("Kerala", 61.0, 4)]);

    let repo = ElectionDataRepository::new(&store);
    let mut fields = Document::new();
    fields.insert("currentTurnout".into(), Value::from(52.5));
    let national = repo.update_national(fields).unwrap();

    assert_eq!(national.current_turnout, 52.5);
    // Untouched totals survive the shallow merge.
    assert_eq!(national.total_voters, 10_000_000);
    assert_ne!(national.last_updated, "2026-08-01T06:00:00.000Z");

    // The merge was persisted, not only returned.
    assert_eq!(repo.national().unwrap().current_turnout, 52.5);
}

#[test]
fn update_state_targets_one_state_by_name() {
    let (_dir, store) = temp_store();
    seed_singleton(
        &store,
        vec![state("Kerala", 61.0, 4), state("Goa", 55.0, 2)],
    );

    let repo = ElectionDataRepository::new(&store);
    let mut fields = Document::new();
    fields.insert("incidents".into(), Value::from(9u64));
    fields.insert("status".into(), Value::from("alert"));
    let updated = repo.update_state("Goa", fields).unwrap().unwrap();

    assert_eq!(updated.incidents, 9);
    assert_ne!(updated.last_updated, "2026-08-01T06:00:00.000Z");

    // The sibling state is untouched.
    let kerala = repo.state_by_name("Kerala").unwrap().unwrap();
    assert_eq!(kerala.incidents, 4);
    assert_eq!(kerala.last_updated, "2026-08-01T06:00:00.000Z");

    assert!(repo.update_state("Atlantis", Document::new()).unwrap().is_none());
}

#[test]
fn dashboard_picks_extremes_with_leftmost_tie_break() {
    let (_dir, store) = temp_store();
    seed_singleton(
        &store,
        vec![
            state("Kerala", 70.0, 4),
            state("Goa", 70.0, 9),
            state("Bihar", 40.0, 9),
            state("Assam", 40.0, 1),
        ],
    );

    let dashboard = ElectionDataRepository::new(&store).dashboard().unwrap();
    let summary = dashboard.summary;
    // Kerala and Goa tie on turnout; the leftmost (Kerala) wins.
    assert_eq!(summary.highest_turnout.name, "Kerala");
    // Bihar and Assam tie on the low end; Bihar is leftmost.
    assert_eq!(summary.lowest_turnout.name, "Bihar");
    // Goa and Bihar tie on incidents; Goa comes first.
    assert_eq!(summary.most_incidents.name, "Goa");
    assert_eq!(summary.total_states, 4);
}

#[test]
fn dashboard_with_no_states_is_not_found() {
    let (_dir, store) = temp_store();
    seed_singleton(&store, vec![]);
    let err = ElectionDataRepository::new(&store).dashboard().unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

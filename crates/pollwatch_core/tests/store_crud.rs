use pollwatch_core::{Document, JsonStore, StoreConfig, StoreError};
use serde_json::{json, Value};
use tempfile::TempDir;

fn temp_store() -> (TempDir, JsonStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonStore::open(&StoreConfig::new(dir.path().join("data"))).expect("open store");
    (dir, store)
}

fn doc(value: Value) -> Document {
    value.as_object().expect("object literal").clone()
}

#[test]
fn missing_collection_reads_as_empty() {
    let (_dir, store) = temp_store();
    let docs = store.read_collection("incidents").unwrap();
    assert!(docs.is_empty());
}

#[test]
fn create_assigns_monotonic_ids_from_one() {
    let (_dir, store) = temp_store();
    for expected in 1..=3u64 {
        let created = store
            .create("incidents", doc(json!({"state": "Kerala"})))
            .unwrap();
        assert_eq!(created.get("id").and_then(Value::as_u64), Some(expected));
    }
}

#[test]
fn create_stamps_both_timestamps() {
    let (_dir, store) = temp_store();
    let created = store.create("incidents", doc(json!({}))).unwrap();
    let created_at = created.get("createdAt").and_then(Value::as_str).unwrap();
    let updated_at = created.get("updatedAt").and_then(Value::as_str).unwrap();
    assert_eq!(created_at, updated_at);
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
}

#[test]
fn deleting_a_middle_id_never_resurrects_it() {
    let (_dir, store) = temp_store();
    store.create("incidents", doc(json!({"n": 1}))).unwrap();
    store.create("incidents", doc(json!({"n": 2}))).unwrap();
    store.create("incidents", doc(json!({"n": 3}))).unwrap();

    // Remove id 2; the next id derives from the surviving max (3), so the
    // freed middle id is never handed out again.
    assert!(store.delete("incidents", 2).unwrap());
    let fourth = store.create("incidents", doc(json!({"n": 4}))).unwrap();
    assert_eq!(fourth.get("id").and_then(Value::as_u64), Some(4));
}

#[test]
fn round_trip_preserves_documents() {
    let (_dir, store) = temp_store();
    let docs = vec![
        doc(json!({"id": 1, "name": "a", "nested": {"x": true}})),
        doc(json!({"id": 2, "name": "b", "value": null})),
    ];
    store.write_collection("stations", &docs).unwrap();
    let loaded = store.read_collection("stations").unwrap();
    assert_eq!(loaded, docs);
}

#[test]
fn find_matches_on_every_query_field() {
    let (_dir, store) = temp_store();
    store
        .create("incidents", doc(json!({"state": "Kerala", "priority": "high"})))
        .unwrap();
    store
        .create("incidents", doc(json!({"state": "Kerala", "priority": "low"})))
        .unwrap();
    store
        .create("incidents", doc(json!({"state": "Goa", "priority": "high"})))
        .unwrap();

    let kerala = store
        .find("incidents", &doc(json!({"state": "Kerala"})))
        .unwrap();
    assert_eq!(kerala.len(), 2);

    let kerala_high = store
        .find(
            "incidents",
            &doc(json!({"state": "Kerala", "priority": "high"})),
        )
        .unwrap();
    assert_eq!(kerala_high.len(), 1);

    let all = store.find("incidents", &Document::new()).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn find_one_returns_first_match_in_stored_order() {
    let (_dir, store) = temp_store();
    store
        .create("incidents", doc(json!({"state": "Kerala", "n": 1})))
        .unwrap();
    store
        .create("incidents", doc(json!({"state": "Kerala", "n": 2})))
        .unwrap();

    let first = store
        .find_one("incidents", &doc(json!({"state": "Kerala"})))
        .unwrap()
        .unwrap();
    assert_eq!(first.get("n").and_then(Value::as_u64), Some(1));

    let absent = store
        .find_one("incidents", &doc(json!({"state": "Punjab"})))
        .unwrap();
    assert!(absent.is_none());
}

#[test]
fn update_merges_fields_and_restamps_updated_at() {
    let (_dir, store) = temp_store();
    let created = store
        .create("incidents", doc(json!({"status": "pending", "priority": "high"})))
        .unwrap();
    let id = created.get("id").and_then(Value::as_u64).unwrap();

    let updated = store
        .update("incidents", id, doc(json!({"status": "resolved"})))
        .unwrap()
        .unwrap();
    assert_eq!(
        updated.get("status").and_then(Value::as_str),
        Some("resolved")
    );
    // Untouched fields are retained by the shallow merge.
    assert_eq!(
        updated.get("priority").and_then(Value::as_str),
        Some("high")
    );
    assert_eq!(updated.get("createdAt"), created.get("createdAt"));
}

#[test]
fn update_cannot_change_the_id() {
    let (_dir, store) = temp_store();
    let created = store.create("incidents", doc(json!({}))).unwrap();
    let id = created.get("id").and_then(Value::as_u64).unwrap();

    let updated = store
        .update("incidents", id, doc(json!({"id": 999})))
        .unwrap()
        .unwrap();
    assert_eq!(updated.get("id").and_then(Value::as_u64), Some(id));
}

#[test]
fn update_of_missing_id_returns_none_and_leaves_collection_unchanged() {
    let (_dir, store) = temp_store();
    store.create("incidents", doc(json!({"n": 1}))).unwrap();
    let before = store.read_collection("incidents").unwrap();

    let updated = store
        .update("incidents", 42, doc(json!({"n": 2})))
        .unwrap();
    assert!(updated.is_none());
    assert_eq!(store.read_collection("incidents").unwrap(), before);
}

#[test]
fn delete_of_missing_id_is_false_and_idempotent() {
    let (_dir, store) = temp_store();
    let created = store.create("incidents", doc(json!({}))).unwrap();
    let id = created.get("id").and_then(Value::as_u64).unwrap();

    assert!(!store.delete("incidents", 42).unwrap());
    assert!(store.delete("incidents", id).unwrap());
    assert!(!store.delete("incidents", id).unwrap());
    assert!(store.read_collection("incidents").unwrap().is_empty());
}

#[test]
fn corrupt_collection_file_is_an_error_not_empty() {
    let (_dir, store) = temp_store();
    store.create("incidents", doc(json!({}))).unwrap();
    std::fs::write(store.data_dir().join("incidents.json"), "{not json").unwrap();

    let err = store.read_collection("incidents").unwrap_err();
    assert!(matches!(
        err,
        StoreError::CorruptData { ref collection, .. } if collection == "incidents"
    ));
}

#[test]
fn singleton_value_round_trips() {
    let (_dir, store) = temp_store();
    assert!(store.read_value("electionData").unwrap().is_none());

    let value = json!({"national": {"totalVoters": 10}, "states": []});
    store.write_value("electionData", &value).unwrap();
    assert_eq!(store.read_value("electionData").unwrap(), Some(value));
}

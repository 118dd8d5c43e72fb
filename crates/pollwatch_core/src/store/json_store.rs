//! Per-collection JSON file store.
//!
//! # Responsibility
//! - Generic CRUD over on-disk JSON collections with lazy file creation and
//!   auto-increment ids.
//! - Stamp `id`, `createdAt` and `updatedAt` on write paths.
//!
//! # Invariants
//! - Ids are unique within a collection; assignment is max existing id + 1
//!   (1 when empty), never a fill of interior gaps.
//! - Writes go through a temp file and an atomic rename, so a reader never
//!   observes a half-written collection.
//! - `create`/`update`/`delete` hold the collection's lock across the whole
//!   read-modify-write sequence, so concurrent writers on one collection
//!   execute as if serialized.

use super::{StoreError, StoreResult};
use chrono::{SecondsFormat, Utc};
use log::{debug, error};
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// One record within a collection: a mapping of field name to JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Storage configuration, constructor-injected into [`JsonStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one `<collection>.json` file per collection.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Whether the data directory already exists on disk.
    ///
    /// Absence is the first-run signal used by seed/bootstrap.
    pub fn is_initialized(&self) -> bool {
        self.data_dir.exists()
    }
}

/// File-backed document store, one JSON file per collection.
pub struct JsonStore {
    data_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl JsonStore {
    /// Opens the store, creating the data directory when absent.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|err| {
            error!(
                "event=store_open module=store status=error data_dir={} error={}",
                config.data_dir.display(),
                err
            );
            StoreError::Io(err)
        })?;
        debug!(
            "event=store_open module=store status=ok data_dir={}",
            config.data_dir.display()
        );
        Ok(Self {
            data_dir: config.data_dir.clone(),
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the full collection, or an empty sequence when the file does
    /// not yet exist.
    ///
    /// # Errors
    /// - `CorruptData` when the file exists but is not a JSON array of
    ///   objects.
    pub fn read_collection(&self, name: &str) -> StoreResult<Vec<Document>> {
        match self.read_raw(name)? {
            None => Ok(Vec::new()),
            Some(body) => serde_json::from_str(&body).map_err(|source| {
                error!(
                    "event=collection_read module=store status=error collection={} error_code=corrupt_data",
                    name
                );
                StoreError::CorruptData {
                    collection: name.to_string(),
                    source,
                }
            }),
        }
    }

    /// Replaces the collection's persisted content atomically.
    pub fn write_collection(&self, name: &str, docs: &[Document]) -> StoreResult<()> {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_locked(name, docs)
    }

    /// Returns all documents whose fields exactly equal every field of
    /// `query`. An empty query matches all documents.
    pub fn find(&self, name: &str, query: &Document) -> StoreResult<Vec<Document>> {
        let docs = self.read_collection(name)?;
        Ok(docs
            .into_iter()
            .filter(|doc| matches_query(doc, query))
            .collect())
    }

    /// Returns the first document (in stored order) matching `query`.
    /// Absence is `Ok(None)`, never an error.
    pub fn find_one(&self, name: &str, query: &Document) -> StoreResult<Option<Document>> {
        let docs = self.read_collection(name)?;
        Ok(docs.into_iter().find(|doc| matches_query(doc, query)))
    }

    /// Appends a new document with a fresh id and creation timestamps.
    ///
    /// The id is max existing id + 1, or 1 for an empty collection.
    pub fn create(&self, name: &str, fields: Document) -> StoreResult<Document> {
        self.create_if(name, fields, |_| Ok(()))
    }

    /// Like [`Self::create`], but runs `admit` over the current collection
    /// contents first, under the same collection lock as the append. A
    /// rejecting `admit` leaves the collection untouched.
    ///
    /// This closes the check-then-act window for write-time constraints
    /// (uniqueness): no other writer can slip in between the check and the
    /// append.
    pub fn create_if<E>(
        &self,
        name: &str,
        mut fields: Document,
        admit: impl FnOnce(&[Document]) -> Result<(), E>,
    ) -> Result<Document, E>
    where
        E: From<StoreError>,
    {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut docs = self.read_collection(name)?;
        admit(&docs)?;
        let next_id = docs
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_u64))
            .max()
            .map_or(1, |max| max + 1);

        let now = now_rfc3339();
        fields.insert("id".to_string(), Value::from(next_id));
        fields.insert("createdAt".to_string(), Value::from(now.clone()));
        fields.insert("updatedAt".to_string(), Value::from(now));

        docs.push(fields.clone());
        self.write_locked(name, &docs)?;
        debug!(
            "event=doc_create module=store status=ok collection={} id={}",
            name, next_id
        );
        Ok(fields)
    }

    /// Shallow-merges `fields` over the document with `id` and re-stamps
    /// `updatedAt`. Returns `Ok(None)` without rewriting when no document
    /// has that id; never creates one.
    ///
    /// The `id` field itself cannot be changed through an update.
    pub fn update(
        &self,
        name: &str,
        id: u64,
        fields: Document,
    ) -> StoreResult<Option<Document>> {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut docs = self.read_collection(name)?;
        let Some(doc) = docs
            .iter_mut()
            .find(|doc| doc.get("id").and_then(Value::as_u64) == Some(id))
        else {
            return Ok(None);
        };

        for (key, value) in fields {
            if key == "id" {
                continue;
            }
            doc.insert(key, value);
        }
        doc.insert("updatedAt".to_string(), Value::from(now_rfc3339()));

        let updated = doc.clone();
        self.write_locked(name, &docs)?;
        debug!(
            "event=doc_update module=store status=ok collection={} id={}",
            name, id
        );
        Ok(Some(updated))
    }

    /// Physically removes the document with `id`; returns whether a removal
    /// occurred. Absence leaves the collection untouched on disk.
    pub fn delete(&self, name: &str, id: u64) -> StoreResult<bool> {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut docs = self.read_collection(name)?;
        let before = docs.len();
        docs.retain(|doc| doc.get("id").and_then(Value::as_u64) != Some(id));
        if docs.len() == before {
            return Ok(false);
        }

        self.write_locked(name, &docs)?;
        debug!(
            "event=doc_delete module=store status=ok collection={} id={}",
            name, id
        );
        Ok(true)
    }

    /// Reads a singleton collection (one JSON object rather than an array).
    /// Used by the `electionData` collection.
    pub fn read_value(&self, name: &str) -> StoreResult<Option<Value>> {
        match self.read_raw(name)? {
            None => Ok(None),
            Some(body) => serde_json::from_str(&body)
                .map(Some)
                .map_err(|source| StoreError::CorruptData {
                    collection: name.to_string(),
                    source,
                }),
        }
    }

    /// Replaces a singleton collection's content atomically.
    pub fn write_value(&self, name: &str, value: &Value) -> StoreResult<()> {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_value_locked(name, value)
    }

    /// Runs `mutate` over the singleton value as one serialized
    /// read-modify-write: the collection lock is held for the whole closure
    /// plus the write-back. The caller's error type is propagated unchanged.
    pub fn modify_value<T, E>(
        &self,
        name: &str,
        mutate: impl FnOnce(Option<Value>) -> Result<(Value, T), E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let lock = self.collection_lock(name);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = match self.read_raw(name)? {
            None => None,
            Some(body) => Some(serde_json::from_str(&body).map_err(|source| {
                StoreError::from_corrupt(name, source)
            })?),
        };
        let (next, out) = mutate(current)?;
        self.write_value_locked(name, &next)?;
        Ok(out)
    }

    fn read_raw(&self, name: &str) -> StoreResult<Option<String>> {
        match std::fs::read_to_string(self.collection_path(name)) {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                error!(
                    "event=collection_read module=store status=error collection={} error={}",
                    name, err
                );
                Err(StoreError::Io(err))
            }
        }
    }

    fn write_locked(&self, name: &str, docs: &[Document]) -> StoreResult<()> {
        let body = serde_json::to_string_pretty(docs)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;
        self.replace_file(name, &body)
    }

    fn write_value_locked(&self, name: &str, value: &Value) -> StoreResult<()> {
        let body = serde_json::to_string_pretty(value)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;
        self.replace_file(name, &body)
    }

    /// Temp-file-then-rename replacement; the rename is what makes a
    /// half-written collection unobservable.
    fn replace_file(&self, name: &str, body: &str) -> StoreResult<()> {
        let target = self.collection_path(name);
        let tmp = target.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|err| {
            error!(
                "event=collection_write module=store status=error collection={} error={}",
                name, err
            );
            StoreError::Io(err)
        })?;
        std::fs::rename(&tmp, &target).map_err(|err| {
            error!(
                "event=collection_write module=store status=error collection={} error={}",
                name, err
            );
            StoreError::Io(err)
        })?;
        Ok(())
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    /// Returns the mutex serializing all writers of one collection. A
    /// poisoned lock is recovered rather than propagated: the protected
    /// state lives on disk in an always-consistent file, not in the mutex.
    fn collection_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Path of the data directory this store was opened on.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn matches_query(doc: &Document, query: &Document) -> bool {
    query
        .iter()
        .all(|(key, value)| doc.get(key) == Some(value))
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

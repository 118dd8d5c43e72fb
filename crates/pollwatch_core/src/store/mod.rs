//! Flat-file JSON storage for collections.
//!
//! # Responsibility
//! - Persist each collection as one JSON file under the data directory.
//! - Hide the physical storage format from repositories.
//!
//! # Invariants
//! - A collection file is always replaced wholesale, never patched in place.
//! - A missing file reads as an empty collection; an unparsable file is a
//!   `CorruptData` error, never silently coerced to empty.
//! - Read-modify-write sequences on one collection are serialized.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_store;

pub use json_store::{Document, JsonStore, StoreConfig};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying persistence failed (disk, permissions). Not retried here;
    /// retry policy belongs to the caller.
    Io(std::io::Error),
    /// The collection file exists but does not parse as the expected JSON
    /// shape. Fatal for that read, since treating it as empty would mask
    /// data loss.
    CorruptData {
        collection: String,
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn from_corrupt(collection: &str, source: serde_json::Error) -> Self {
        Self::CorruptData {
            collection: collection.to_string(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o failure: {err}"),
            Self::CorruptData { collection, source } => {
                write!(f, "collection `{collection}` is corrupt: {source}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::CorruptData { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

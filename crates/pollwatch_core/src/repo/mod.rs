//! Domain repositories over the JSON store.
//!
//! # Responsibility
//! - Translate domain operations into store queries/updates, one repository
//!   per collection.
//! - Enforce domain rules (uniqueness, password hashing, workflow defaults)
//!   that the generic store knows nothing about.
//!
//! # Invariants
//! - Repositories never touch collection files directly; all persistence
//!   goes through [`crate::store::JsonStore`].
//! - Simple lookups report absence as `Ok(None)`; write-time constraint
//!   violations are errors.

use crate::store::StoreError;
use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod election_repo;
pub mod incident_repo;
pub mod station_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-layer error taxonomy.
#[derive(Debug)]
pub enum RepoError {
    /// Propagated storage failure (I/O or corrupt collection file).
    Store(StoreError),
    /// Uniqueness constraint violated on create; `field` names the
    /// colliding field.
    Duplicate { field: &'static str },
    /// An operation that requires presence found nothing.
    NotFound,
    /// A persisted document failed to deserialize into its typed model.
    InvalidData(String),
    /// Password hashing failed.
    PasswordHash(bcrypt::BcryptError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Duplicate { field } => write!(f, "duplicate value for unique field `{field}`"),
            Self::NotFound => write!(f, "no matching record"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::PasswordHash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::PasswordHash(err) => Some(err),
            Self::Duplicate { .. } | Self::NotFound | Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<bcrypt::BcryptError> for RepoError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::PasswordHash(value)
    }
}

/// Deserializes one stored document into its typed model.
pub(crate) fn from_doc<T: DeserializeOwned>(doc: crate::store::Document) -> RepoResult<T> {
    serde_json::from_value(Value::Object(doc)).map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// Deserializes a whole collection, failing on the first invalid document.
pub(crate) fn from_docs<T: DeserializeOwned>(
    docs: Vec<crate::store::Document>,
) -> RepoResult<Vec<T>> {
    docs.into_iter().map(from_doc).collect()
}

/// Parses a stored RFC 3339 timestamp; unparsable values read as `None` so
/// one bad record degrades a statistic instead of failing the whole scan.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;

    #[test]
    fn parse_timestamp_accepts_store_format() {
        let parsed = parse_timestamp("2026-08-30T08:15:00.123Z");
        assert!(parsed.is_some());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}

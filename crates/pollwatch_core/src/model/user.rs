//! User account model.
//!
//! # Invariants
//! - `email` is unique across the collection, compared case-insensitively
//!   and stored lowercased.
//! - `username` is unique when present; defaulted from the email local part.
//! - `password` holds a bcrypt hash, never plaintext, and is omitted from
//!   serialized output when `None` so stripped users never leak it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Authorization role for a monitoring user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Field observer reporting from polling stations.
    Observer,
    /// Regional coordinator managing observers.
    Coordinator,
    /// Full administrative access.
    Admin,
    /// Read-only national monitor.
    Monitor,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Observer => "observer",
            Self::Coordinator => "coordinator",
            Self::Admin => "admin",
            Self::Monitor => "monitor",
        };
        f.write_str(name)
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    /// Bcrypt hash. `None` on user values handed to external callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
    pub organization: String,
    pub phone: String,
    pub is_active: bool,
    /// RFC 3339 timestamp of the most recent login, `None` before the first.
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Returns a copy safe to hand to external callers: the password hash
    /// is stripped.
    pub fn stripped(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }
}

/// Input for creating a user account. The plaintext password is hashed by
/// the repository before anything is persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    /// Defaulted from the email local part when `None`.
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    /// Defaults to [`Role::Observer`].
    pub role: Option<Role>,
    pub organization: String,
    pub phone: String,
}

/// Aggregate user statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub by_role: BTreeMap<String, u64>,
    pub active: u64,
    /// Users whose `lastLogin` falls within the last 7×24 hours.
    pub recent_logins: u64,
    pub by_organization: BTreeMap<String, u64>,
}

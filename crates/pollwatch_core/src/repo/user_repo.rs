//! User repository: account creation, credential handling, user statistics.
//!
//! # Invariants
//! - `email` is stored lowercased; duplicate checks compare lowercased
//!   values, so uniqueness is case-insensitive.
//! - Plaintext passwords never reach the store; hashing happens here.
//! - Users returned from externally-facing methods have the hash stripped.

use super::{from_doc, from_docs, parse_timestamp, RepoError, RepoResult};
use crate::model::user::{NewUser, Role, User, UserStats};
use crate::store::{Document, JsonStore};
use chrono::{Duration, Utc};
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

const COLLECTION: &str = "users";

/// Typed façade over the `users` collection.
pub struct UserRepository<'store> {
    store: &'store JsonStore,
    hash_cost: u32,
}

impl<'store> UserRepository<'store> {
    pub fn new(store: &'store JsonStore) -> Self {
        Self::with_hash_cost(store, bcrypt::DEFAULT_COST)
    }

    /// Overrides the bcrypt cost. Tests use a low cost to stay fast; the
    /// default is [`bcrypt::DEFAULT_COST`].
    pub fn with_hash_cost(store: &'store JsonStore, hash_cost: u32) -> Self {
        Self { store, hash_cost }
    }

    /// Creates a user account.
    ///
    /// # Errors
    /// - `Duplicate { field: "email" }` when the (case-insensitive) email is
    ///   already taken.
    /// - `Duplicate { field: "username" }` when the username is taken; a
    ///   missing username defaults to the email local part first.
    ///
    /// The duplicate checks run under the same collection lock as the
    /// append, so two concurrent creates with the same email cannot both
    /// pass. The returned user has `password: None`.
    pub fn create(&self, new_user: NewUser) -> RepoResult<User> {
        let email = new_user.email.trim().to_lowercase();
        let username = new_user
            .username
            .unwrap_or_else(|| local_part(&email).to_string());

        let hashed = bcrypt::hash(&new_user.password, self.hash_cost)?;
        let role = new_user.role.unwrap_or(Role::Observer);

        let mut fields = Document::new();
        fields.insert("firstName".into(), Value::from(new_user.first_name));
        fields.insert("lastName".into(), Value::from(new_user.last_name));
        fields.insert("username".into(), Value::from(username.clone()));
        fields.insert("email".into(), Value::from(email.clone()));
        fields.insert("password".into(), Value::from(hashed));
        fields.insert("role".into(), Value::from(role.to_string()));
        fields.insert("organization".into(), Value::from(new_user.organization));
        fields.insert("phone".into(), Value::from(new_user.phone));
        fields.insert("isActive".into(), Value::Bool(true));
        fields.insert("lastLogin".into(), Value::Null);

        let doc = self.store.create_if(COLLECTION, fields, |docs| {
            // Stored emails are lowercased at creation, so the comparison
            // against the lowercased input is case-insensitive.
            let email_taken = docs
                .iter()
                .any(|d| d.get("email").and_then(Value::as_str) == Some(email.as_str()));
            if email_taken {
                warn!("event=user_create module=repo status=rejected error_code=duplicate_email");
                return Err(RepoError::Duplicate { field: "email" });
            }
            let username_taken = docs
                .iter()
                .any(|d| d.get("username").and_then(Value::as_str) == Some(username.as_str()));
            if username_taken {
                warn!(
                    "event=user_create module=repo status=rejected error_code=duplicate_username"
                );
                return Err(RepoError::Duplicate { field: "username" });
            }
            Ok(())
        })?;
        let user: User = from_doc(doc)?;
        debug!(
            "event=user_create module=repo status=ok id={} role={}",
            user.id, user.role
        );
        Ok(user.stripped())
    }

    /// Looks up by (case-insensitive) email. The result keeps the stored
    /// hash for credential checks; strip before exposing.
    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut query = Document::new();
        query.insert("email".into(), Value::from(email.trim().to_lowercase()));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    /// Looks up by exact username. Keeps the stored hash, like
    /// [`Self::find_by_email`].
    pub fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut query = Document::new();
        query.insert("username".into(), Value::from(username));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    pub fn find_by_id(&self, id: u64) -> RepoResult<Option<User>> {
        let mut query = Document::new();
        query.insert("id".into(), Value::from(id));
        self.store.find_one(COLLECTION, &query)?.map(from_doc).transpose()
    }

    /// Full collection including stored hashes. Internal use only.
    pub fn find_all(&self) -> RepoResult<Vec<User>> {
        from_docs(self.store.read_collection(COLLECTION)?)
    }

    /// Shallow update of arbitrary fields. A `password` field is re-hashed
    /// before persisting. Returns the updated user with the hash stripped,
    /// or `Ok(None)` when the id is absent.
    pub fn update(&self, id: u64, mut fields: Document) -> RepoResult<Option<User>> {
        if let Some(Value::String(plain)) = fields.get("password") {
            let hashed = bcrypt::hash(plain, self.hash_cost)?;
            fields.insert("password".into(), Value::from(hashed));
        }
        let updated = self.store.update(COLLECTION, id, fields)?;
        updated
            .map(from_doc)
            .transpose()
            .map(|user: Option<User>| user.map(|u| u.stripped()))
    }

    pub fn update_password(&self, id: u64, new_password: &str) -> RepoResult<Option<User>> {
        let mut fields = Document::new();
        fields.insert("password".into(), Value::from(new_password));
        self.update(id, fields)
    }

    pub fn activate(&self, id: u64) -> RepoResult<Option<User>> {
        self.set_active(id, true)
    }

    pub fn deactivate(&self, id: u64) -> RepoResult<Option<User>> {
        self.set_active(id, false)
    }

    fn set_active(&self, id: u64, is_active: bool) -> RepoResult<Option<User>> {
        let mut fields = Document::new();
        fields.insert("isActive".into(), Value::Bool(is_active));
        self.update(id, fields)
    }

    /// Stamps `lastLogin` with the current time.
    pub fn record_login(&self, id: u64) -> RepoResult<Option<User>> {
        let mut fields = Document::new();
        fields.insert(
            "lastLogin".into(),
            Value::from(crate::store::json_store::now_rfc3339()),
        );
        self.update(id, fields)
    }

    pub fn delete(&self, id: u64) -> RepoResult<bool> {
        Ok(self.store.delete(COLLECTION, id)?)
    }

    /// Checks a plaintext password against a stored bcrypt hash. Mismatch
    /// and malformed hashes both return `false`; this never errors.
    pub fn verify_password(plain: &str, hashed: &str) -> bool {
        bcrypt::verify(plain, hashed).unwrap_or(false)
    }

    pub fn users_by_role(&self, role: Role) -> RepoResult<Vec<User>> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|user| user.role == role)
            .map(|user| user.stripped())
            .collect())
    }

    pub fn active_users(&self) -> RepoResult<Vec<User>> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|user| user.is_active)
            .map(|user| user.stripped())
            .collect())
    }

    /// Aggregates totals, role/organization breakdowns, active count, and
    /// logins within the last 7×24 hours.
    pub fn stats(&self) -> RepoResult<UserStats> {
        let users = self.find_all()?;
        let login_cutoff = Utc::now() - Duration::days(7);

        let mut by_role: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_organization: BTreeMap<String, u64> = BTreeMap::new();
        let mut active = 0;
        let mut recent_logins = 0;

        for user in &users {
            *by_role.entry(user.role.to_string()).or_default() += 1;
            *by_organization.entry(user.organization.clone()).or_default() += 1;
            if user.is_active {
                active += 1;
            }
            let logged_in_recently = user
                .last_login
                .as_deref()
                .and_then(parse_timestamp)
                .is_some_and(|at| at.with_timezone(&Utc) > login_cutoff);
            if logged_in_recently {
                recent_logins += 1;
            }
        }

        Ok(UserStats {
            total: users.len() as u64,
            by_role,
            active,
            recent_logins,
            by_organization,
        })
    }
}

/// Local part of an email address: everything before the first `@`.
fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

//! Domain models for election monitoring.
//!
//! # Responsibility
//! - Define the typed records persisted in each collection.
//! - Keep on-disk field naming (camelCase JSON) in one place via serde
//!   attributes.
//!
//! # Invariants
//! - Every persisted record carries `id`, `createdAt` and `updatedAt`
//!   stamped by the store; models treat them as read-only.
//! - Where the data model enumerates values (roles, station status, state
//!   status) the model uses a closed enum, not a free string.

pub mod election;
pub mod incident;
pub mod station;
pub mod user;

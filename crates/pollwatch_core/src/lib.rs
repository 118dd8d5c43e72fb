//! Core domain logic for PollWatch election monitoring.
//! This crate is the single source of truth for business invariants.
//!
//! The HTTP route layer consumes this crate in-process; no wire protocol is
//! defined here. Persistence is one JSON file per collection under a data
//! directory, replaced wholesale on every write.

pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::election::{
    DashboardStats, DashboardSummary, ElectionData, NationalSummary, StateRecord, StateStatus,
};
pub use model::incident::{Incident, IncidentStats, NewIncident};
pub use model::station::{
    GeoPoint, PollingStation, StationStats, StationStatus, StateStationStats,
};
pub use model::user::{NewUser, Role, User, UserStats};
pub use repo::election_repo::ElectionDataRepository;
pub use repo::incident_repo::IncidentRepository;
pub use repo::station_repo::PollingStationRepository;
pub use repo::user_repo::UserRepository;
pub use repo::{RepoError, RepoResult};
pub use seed::{ensure_seeded, seed_defaults};
pub use store::json_store::{Document, JsonStore, StoreConfig};
pub use store::{StoreError, StoreResult};

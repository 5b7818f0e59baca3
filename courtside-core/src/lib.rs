//! Core types and service wiring for the courtside venue availability aggregator.

/// Grouping of raw records into venues, facility locations, and slots.
pub mod aggregate;
/// Persisted bookmarks and their reconciliation with live venues.
pub mod bookmarks;
/// Tunable thresholds and TTLs.
pub mod config;
/// Canonical district table and fuzzy district matching.
pub mod district;
/// Search, district, sport, and time-range filters.
pub mod filter;
/// Per-sport fetch timestamps and staleness.
pub mod freshness;
/// Coercion of upstream payload rows into typed records.
pub mod ingest;
/// Domain models and identifiers shared by all crates.
pub mod model;
/// Registry for plugging sport-specific providers into the service.
pub mod plugin;
/// Traits describing the external collaborators.
pub mod ports;
/// User display preferences.
pub mod preferences;
/// Date-ordered sections for sticky-header lists.
pub mod sections;
/// High-level service facade used by clients.
pub mod service;
/// In-memory key-value store.
pub mod store;

pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;

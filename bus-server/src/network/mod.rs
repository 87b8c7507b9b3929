//! In-memory bus network.
//!
//! Imported routes, their stations and edges, queryable by area. This is
//! the station-lookup collaborator the planner reads from.

mod snapshot;
mod store;

pub use snapshot::{NetworkSnapshot, SnapshotError};
pub use store::{InsertSummary, NetworkStore, StationLookup};

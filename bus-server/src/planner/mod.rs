//! Route planner.
//!
//! Answers "how do I get from here to there by bus": picks the stations
//! nearest to both points, builds a graph of the stations around them and
//! runs the shortest-path engine between the two.

mod config;
mod plan;

pub use config::PlannerConfig;
pub use plan::{NearbyStation, Plan, PlanError, PlanRequest, PlannedStop, plan, stations_within_radius};

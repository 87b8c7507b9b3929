//! Planning a bus journey between two points.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Bound, GeoPoint, Station, StationId};
use crate::graph::{PathError, StationWithEdges, build_graph, shortest_paths_bounded};
use crate::network::StationLookup;

use super::config::PlannerConfig;

/// Error from route planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// No known station within the search radius of a point.
    #[error("no station within {radius_m} m of ({}, {})", .point.latitude, .point.longitude)]
    NoStationNear { point: GeoPoint, radius_m: f64 },

    /// The stations exist but no route connects them.
    #[error("no route from station {from} to station {to}")]
    Unreachable { from: StationId, to: StationId },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Plan request: two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

impl PlanRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

/// A station with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    pub station: Station,
    pub distance_m: f64,
}

/// One stop of a plan with the cumulative cost to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedStop {
    pub station: Station,
    pub cost_secs: f64,
}

/// A planned journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub stops: Vec<PlannedStop>,
    pub total_secs: f64,
    /// Walk from the origin to the first stop.
    pub walk_to_first_m: f64,
    /// Walk from the last stop to the destination.
    pub walk_from_last_m: f64,
    /// Size of the graph that was searched.
    pub nodes_considered: usize,
    /// Edges that left the searched area.
    pub edges_dropped: usize,
}

/// Stations within `radius_m` of `point`, nearest first.
pub fn stations_within_radius(stations: &[Station], point: GeoPoint, radius_m: f64) -> Vec<NearbyStation> {
    let mut nearby: Vec<NearbyStation> = stations
        .iter()
        .filter_map(|s| {
            let distance_m = s.distance_to(point);
            (distance_m <= radius_m).then(|| NearbyStation {
                station: s.clone(),
                distance_m,
            })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby
}

/// Plan a journey from `request.origin` to `request.destination`.
///
/// Loads the stations in a box around both points from `lookup`, boards at
/// the station nearest the origin and alights at the one nearest the
/// destination (each within `config.search_radius_m`), and returns the
/// cheapest path between them.
pub fn plan<L: StationLookup + ?Sized>(
    lookup: &L,
    request: &PlanRequest,
    config: &PlannerConfig,
) -> Result<Plan, PlanError> {
    let margin = config.bound_margin_m.max(config.search_radius_m);
    let bound = Bound::around(&[request.origin, request.destination], margin)
        .unwrap_or(Bound {
            sw: request.origin,
            ne: request.origin,
        });

    let stations = lookup.stations_in_bound(&bound);
    debug!(stations = stations.len(), "Loaded stations for planning");

    let board = nearest(&stations, request.origin, config.search_radius_m)?;
    let alight = nearest(&stations, request.destination, config.search_radius_m)?;

    let input: Vec<StationWithEdges> = stations
        .iter()
        .map(|s| StationWithEdges::new(s.clone(), lookup.edges_for_station(s.id())))
        .collect();
    let built = build_graph(&input);

    let paths = shortest_paths_bounded(&built.graph, board.station.id(), config.max_nodes)?;
    let path = paths.path_to(alight.station.id());
    if path.is_empty() {
        return Err(PlanError::Unreachable {
            from: board.station.id(),
            to: alight.station.id(),
        });
    }

    let by_id: HashMap<StationId, &Station> = stations.iter().map(|s| (s.id(), s)).collect();
    let stops: Vec<PlannedStop> = path
        .iter()
        .filter_map(|id| {
            Some(PlannedStop {
                station: (*by_id.get(id)?).clone(),
                cost_secs: paths.cost(*id)?,
            })
        })
        .collect();
    let total_secs = stops.last().map_or(0.0, |s| s.cost_secs);

    info!(
        from = %board.station,
        to = %alight.station,
        stops = stops.len(),
        total_secs,
        "Planned route"
    );

    Ok(Plan {
        stops,
        total_secs,
        walk_to_first_m: board.distance_m,
        walk_from_last_m: alight.distance_m,
        nodes_considered: built.graph.len(),
        edges_dropped: built.report.dropped.len(),
    })
}

fn nearest(stations: &[Station], point: GeoPoint, radius_m: f64) -> Result<NearbyStation, PlanError> {
    stations_within_radius(stations, point, radius_m)
        .into_iter()
        .next()
        .ok_or(PlanError::NoStationNear { point, radius_m })
}

//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, Station};
use crate::normalize::{NormalizedList, NormalizedRecord, RejectedStation};

/// Default search radius for nearby stops (metres).
pub const DEFAULT_NEARBY_RADIUS_M: u32 = 500;

/// Largest radius accepted for nearby stops (metres).
pub const MAX_NEARBY_RADIUS_M: u32 = 2_000;

/// Query for stops around a point.
#[derive(Debug, Deserialize)]
pub struct NearestStationsQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in metres
    pub radius: Option<u32>,
}

/// Routes serving one nearby stop.
#[derive(Debug, Serialize)]
pub struct StationRoutes {
    pub ars_id: String,
    pub routes: NormalizedList,
}

/// Nearby stops, the routes serving each, and the layout of every such route.
#[derive(Debug, Serialize)]
pub struct NearestStationsResponse {
    pub stations: Vec<NormalizedRecord>,
    pub station_routes: Vec<StationRoutes>,
    /// Full stop list of each distinct route, in route id order
    pub routes: Vec<NormalizedList>,
}

/// South-west / north-east corners of an area.
#[derive(Debug, Deserialize)]
pub struct BoundQuery {
    pub sw_lat: f64,
    pub sw_lon: f64,
    pub ne_lat: f64,
    pub ne_lon: f64,
}

/// Stored stations inside an area.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<Station>,
}

/// Query for a planned journey.
#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
}

/// Result of importing a route.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub route_id: RouteId,
    pub route_number: String,
    /// Accepted stations on the route
    pub stations: usize,
    pub edges: usize,
    pub rejected: Vec<RejectedStation>,
    /// Stations new to the network
    pub stations_added: usize,
    /// Whether the route had been imported before
    pub replaced: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

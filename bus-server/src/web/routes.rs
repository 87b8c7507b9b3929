//! HTTP route handlers.

use std::collections::BTreeSet;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use futures::future::join_all;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::bus_api::{BusApiError, format_ars_id};
use crate::domain::{Bound, GeoPoint};
use crate::graph::PathError;
use crate::network::StationLookup;
use crate::normalize::{
    NEARBY_STATION, NormalizeError, NormalizedList, ROUTE_STATION, STATION_ROUTE, normalize_list,
};
use crate::planner::{Plan, PlanError, PlanRequest, plan};

use super::dto::*;
use super::state::{AppState, ImportError};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/nearest_stations", get(nearest_stations))
        .route("/api/station/:ars_id/routes", get(routes_for_station))
        .route("/api/route/:route_id", get(route))
        .route("/api/route/:route_id/import", post(import_route))
        .route("/api/stations", get(stations_in_bound))
        .route("/api/plan", get(plan_route))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stops near a point, the routes serving each, and those routes' layouts.
async fn nearest_stations(
    State(state): State<AppState>,
    Query(req): Query<NearestStationsQuery>,
) -> Result<Json<NearestStationsResponse>, AppError> {
    let point = validate_point(req.latitude, req.longitude)?;
    let radius = req.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_M);
    if radius == 0 || radius > MAX_NEARBY_RADIUS_M {
        return Err(AppError::BadRequest {
            message: format!("radius must be between 1 and {MAX_NEARBY_RADIUS_M} metres"),
        });
    }

    let raw = state
        .bus
        .stations_by_position(point.latitude, point.longitude, radius)
        .await?;
    let stations = normalize_list(&raw, &NEARBY_STATION);

    // Code 0 marks stops without a public code; those cannot be queried.
    let ars_ids: BTreeSet<u32> = stations
        .entries
        .iter()
        .filter_map(|s| s.integer("ars_id"))
        .filter_map(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
        .collect();

    let lookups = ars_ids.iter().map(|&n| {
        let bus = state.bus.clone();
        async move {
            let ars_id = format_ars_id(n);
            let result = bus.station_by_uid(&ars_id).await;
            (ars_id, result)
        }
    });

    let mut station_routes = Vec::new();
    for (ars_id, result) in join_all(lookups).await {
        match result {
            Ok(raw) => station_routes.push(StationRoutes {
                ars_id,
                routes: normalize_list(&raw, &STATION_ROUTE),
            }),
            Err(e) => warn!(%ars_id, error = %e, "Skipping routes for station"),
        }
    }

    // Several nearby stops usually share routes; fetch each layout once.
    let route_ids: BTreeSet<i64> = station_routes
        .iter()
        .flat_map(|s| &s.routes.entries)
        .filter_map(|r| r.integer("route_id"))
        .collect();

    let layouts = route_ids.iter().map(|&route_id| {
        let bus = state.bus.clone();
        async move { (route_id, bus.route_and_positions(route_id).await) }
    });

    let mut routes = Vec::new();
    for (route_id, result) in join_all(layouts).await {
        match result {
            Ok(raw) => routes.push(normalize_list(&raw, &ROUTE_STATION)),
            Err(e) => warn!(route_id, error = %e, "Skipping route layout"),
        }
    }

    Ok(Json(NearestStationsResponse {
        stations: stations.entries,
        station_routes,
        routes,
    }))
}

/// Routes serving a stop.
async fn routes_for_station(
    State(state): State<AppState>,
    Path(ars_id): Path<u32>,
) -> Result<Json<NormalizedList>, AppError> {
    let raw = state.bus.station_by_uid(&format_ars_id(ars_id)).await?;
    Ok(Json(normalize_list(&raw, &STATION_ROUTE)))
}

/// Ordered stops of a route.
async fn route(
    State(state): State<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<NormalizedList>, AppError> {
    let raw = state.bus.route_and_positions(route_id).await?;
    Ok(Json(normalize_list(&raw, &ROUTE_STATION)))
}

/// Import a route into the network.
async fn import_route(
    State(state): State<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<ImportResponse>, AppError> {
    let outcome = state.import_route(route_id).await?;

    Ok(Json(ImportResponse {
        route_id: outcome.summary.route_id,
        route_number: outcome.route_number,
        stations: outcome.stations,
        edges: outcome.edges,
        rejected: outcome.rejected,
        stations_added: outcome.summary.stations_added,
        replaced: outcome.summary.replaced,
    }))
}

/// Stored stations inside an area.
async fn stations_in_bound(
    State(state): State<AppState>,
    Query(req): Query<BoundQuery>,
) -> Result<Json<StationsResponse>, AppError> {
    let sw = validate_point(req.sw_lat, req.sw_lon)?;
    let ne = validate_point(req.ne_lat, req.ne_lon)?;
    if sw.latitude > ne.latitude || sw.longitude > ne.longitude {
        return Err(AppError::BadRequest {
            message: "south-west corner must be below and left of north-east corner".to_string(),
        });
    }

    let network = state.network.read().await;
    let stations = network.stations_in_bound(&Bound { sw, ne });
    Ok(Json(StationsResponse { stations }))
}

/// Plan a journey over the stored network.
async fn plan_route(
    State(state): State<AppState>,
    Query(req): Query<PlanQuery>,
) -> Result<Json<Plan>, AppError> {
    let request = PlanRequest::new(
        validate_point(req.from_lat, req.from_lon)?,
        validate_point(req.to_lat, req.to_lon)?,
    );

    let network = state.network.read().await;
    let planned = plan(&*network, &request, &state.planner)?;
    Ok(Json(planned))
}

fn validate_point(latitude: f64, longitude: f64) -> Result<GeoPoint, AppError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest {
            message: format!("invalid coordinates: ({latitude}, {longitude})"),
        });
    }
    Ok(GeoPoint::new(latitude, longitude))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// The provider failed or sent unusable data.
    Upstream { message: String },
    Internal { message: String },
}

impl From<BusApiError> for AppError {
    fn from(e: BusApiError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::EmptyResult { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            NormalizeError::MalformedRecord { .. } => AppError::Upstream {
                message: e.to_string(),
            },
        }
    }
}

impl From<ImportError> for AppError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Upstream(e) => e.into(),
            ImportError::Normalize(e) => e.into(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::NoStationNear { .. } | PlanError::Unreachable { .. } => {
                AppError::NotFound {
                    message: e.to_string(),
                }
            }
            PlanError::Path(PathError::GraphTooLarge { .. }) => AppError::BadRequest {
                message: format!("search area too large: {e}"),
            },
            PlanError::Path(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

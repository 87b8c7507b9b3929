//! Turning a `getRouteAndPos.bms` response into a route with its stations
//! and edges.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bus_api::RawResponse;
use crate::domain::{Edge, Route, RouteId, RouteType, Station, StationId, TravelTimeModel};

use super::error::NormalizeError;
use super::field::{NormalizedRecord, normalize};
use super::tables::ROUTE_STATION;

/// A stop left out of an import, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedStation {
    pub station_id: Option<i64>,
    pub name: Option<String>,
    pub reason: String,
}

/// The typed result of importing one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteImport {
    /// Route metadata. `route.stations` is the accepted stops in order and
    /// `route.edges` connects each accepted stop to the next.
    pub route: Route,
    /// Accepted stations, each listed once even when the route revisits it.
    pub stations: Vec<Station>,
    pub rejected: Vec<RejectedStation>,
}

impl RouteImport {
    /// Build a route import from a raw route response.
    ///
    /// Stops with public code `0` or coordinates outside the dataset's range
    /// are rejected and recorded; the edge then runs from the previous
    /// accepted stop to the next one. Edge weights come from the stops'
    /// first departure times via `model`.
    pub fn from_response(
        raw: &RawResponse,
        model: &TravelTimeModel,
    ) -> Result<Self, NormalizeError> {
        let empty = NormalizeError::EmptyResult {
            table: ROUTE_STATION.name,
        };

        let mut rejected = Vec::new();
        let mut entries = Vec::new();
        for record in raw.records() {
            match normalize(record, &ROUTE_STATION) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(error = %e, "Rejecting malformed route record");
                    rejected.push(RejectedStation {
                        station_id: None,
                        name: None,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let first = entries.first().ok_or(empty)?;
        let route_id = first
            .integer("route_id")
            .map(RouteId::new)
            .ok_or(NormalizeError::MalformedRecord {
                table: ROUTE_STATION.name,
                key: "busRouteId",
                reason: "missing".to_string(),
            })?;
        let route_number = first.text("route_number").unwrap_or_default().to_string();
        let route_type = first
            .integer("route_type")
            .and_then(|code| u8::try_from(code).ok())
            .map(RouteType::from);

        let mut stations: Vec<Station> = Vec::new();
        let mut sequence = Vec::new();
        let mut edges = Vec::new();
        let mut prev: Option<(Station, &NormalizedRecord)> = None;

        for entry in &entries {
            let station = match station_from_entry(entry) {
                Ok(station) => station,
                Err(rejection) => {
                    warn!(
                        route = %route_id,
                        station_id = ?rejection.station_id,
                        reason = %rejection.reason,
                        "Rejecting station"
                    );
                    rejected.push(rejection);
                    continue;
                }
            };

            if let Some((prev_station, prev_entry)) = &prev {
                let weight = model.edge_weight(
                    prev_station,
                    prev_entry.clock("first_departure"),
                    &station,
                    entry.clock("first_departure"),
                );
                match Edge::new(prev_station.id(), station.id(), weight) {
                    Ok(edge) => edges.push(edge),
                    Err(e) => warn!(route = %route_id, error = %e, "Dropping edge"),
                }
            }

            sequence.push(station.id());
            if !stations.iter().any(|s| s.id() == station.id()) {
                stations.push(station.clone());
            }
            prev = Some((station, entry));
        }

        info!(
            route = %route_id,
            number = %route_number,
            stations = stations.len(),
            edges = edges.len(),
            rejected = rejected.len(),
            "Imported route"
        );

        Ok(Self {
            route: Route {
                id: route_id,
                number: route_number,
                route_type,
                stations: sequence,
                edges,
                raw: serde_json::to_value(raw).unwrap_or_default(),
            },
            stations,
            rejected,
        })
    }

    pub fn edges(&self) -> &[Edge] {
        &self.route.edges
    }
}

fn station_from_entry(entry: &NormalizedRecord) -> Result<Station, RejectedStation> {
    let station_id = entry.integer("station_id");
    let name = entry.text("station_name").unwrap_or_default().to_string();
    let reject = |reason: String| RejectedStation {
        station_id,
        name: Some(name.clone()),
        reason,
    };

    let id = station_id.ok_or_else(|| reject("missing station id".to_string()))?;
    // Codes that do not fit are treated like the "미정차" placeholder.
    let number = entry
        .integer("ars_id")
        .and_then(|n| u32::try_from(n).ok());
    if entry.integer("ars_id").is_some() && number.is_none() {
        debug!(station = id, "Public code out of range, treating as absent");
    }

    let latitude = entry
        .float("latitude")
        .ok_or_else(|| reject("missing latitude".to_string()))?;
    let longitude = entry
        .float("longitude")
        .ok_or_else(|| reject("missing longitude".to_string()))?;

    Station::new(StationId::new(id), number, name.clone(), latitude, longitude)
        .map_err(|e| reject(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus_api::RawRecord;
    use serde_json::json;

    fn stop(station: i64, ars: &str, lat: f64, begin: &str) -> RawRecord {
        json!({
            "busRouteId": "100100118", "busRouteNm": "401", "routeType": "3",
            "seq": "1", "station": station.to_string(), "stationNo": ars,
            "stationNm": format!("정류소{station}"),
            "gpsX": "127.0", "gpsY": lat.to_string(),
            "beginTm": begin, "lastTm": "22:30", "direction": "장지공영차고지"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn id(n: i64) -> StationId {
        StationId::new(n)
    }

    fn import(records: Vec<RawRecord>) -> RouteImport {
        RouteImport::from_response(&RawResponse::from_records(records), &TravelTimeModel::default())
            .unwrap()
    }

    #[test]
    fn consecutive_stops_become_edges() {
        let imp = import(vec![
            stop(1, "01001", 37.50, "04:00"),
            stop(2, "01002", 37.51, "04:02"),
            stop(3, "01003", 37.52, "04:05"),
        ]);

        assert_eq!(imp.route.id, RouteId::new(100100118));
        assert_eq!(imp.route.number, "401");
        assert_eq!(imp.route.route_type, Some(RouteType::Trunk));
        assert_eq!(imp.route.stations, vec![id(1), id(2), id(3)]);
        assert_eq!(imp.stations.len(), 3);

        let edges: Vec<_> = imp.edges().iter().map(|e| (e.start(), e.end(), e.weight())).collect();
        assert_eq!(edges, vec![(id(1), id(2), 120.0), (id(2), id(3), 180.0)]);
        assert!(imp.rejected.is_empty());
    }

    #[test]
    fn zero_code_station_is_excluded_and_bridged() {
        let imp = import(vec![
            stop(1, "01001", 37.50, "04:00"),
            stop(2, "0", 37.51, "04:02"),
            stop(3, "01003", 37.52, "04:05"),
        ]);

        assert_eq!(imp.route.stations, vec![id(1), id(3)]);
        assert!(imp.stations.iter().all(|s| s.id() != id(2)));
        assert_eq!(imp.rejected.len(), 1);
        assert_eq!(imp.rejected[0].station_id, Some(2));

        let edges: Vec<_> = imp.edges().iter().map(|e| (e.start(), e.end(), e.weight())).collect();
        assert_eq!(edges, vec![(id(1), id(3), 300.0)]);
    }

    #[test]
    fn not_stopping_placeholder_is_kept_without_code() {
        let imp = import(vec![
            stop(1, "미정차", 37.50, "04:00"),
            stop(2, "01002", 37.51, "04:02"),
        ]);
        assert_eq!(imp.stations[0].number(), None);
        assert_eq!(imp.stations[1].number(), Some(1002));
    }

    #[test]
    fn midnight_wrap_uses_fallback_weight() {
        let imp = import(vec![
            stop(1, "01001", 37.50, "23:55"),
            stop(2, "01002", 37.51, "00:05"),
        ]);
        assert_eq!(imp.edges()[0].weight(), 150.0);
    }

    #[test]
    fn missing_times_use_distance_placeholder() {
        let model = TravelTimeModel::default();
        let imp = import(vec![
            stop(1, "01001", 37.50, "  "),
            stop(2, "01002", 37.51, "04:02"),
        ]);
        let expected = model.placeholder_cost(&imp.stations[0], &imp.stations[1]);
        assert!((imp.edges()[0].weight() - expected).abs() < 1e-9);
        assert!(imp.edges()[0].weight() > 0.0);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let imp = import(vec![
            stop(1, "01001", 37.50, "04:00"),
            stop(2, "01002", -33.0, "04:02"),
        ]);
        assert_eq!(imp.stations.len(), 1);
        assert_eq!(imp.rejected.len(), 1);
        assert!(imp.rejected[0].reason.contains("latitude"));
        assert!(imp.edges().is_empty());
    }

    #[test]
    fn revisited_station_listed_once() {
        let imp = import(vec![
            stop(1, "01001", 37.50, "04:00"),
            stop(2, "01002", 37.51, "04:02"),
            stop(1, "01001", 37.50, "04:10"),
        ]);
        assert_eq!(imp.route.stations, vec![id(1), id(2), id(1)]);
        assert_eq!(imp.stations.len(), 2);
        assert_eq!(imp.edges().len(), 2);
    }

    #[test]
    fn empty_response_is_an_error() {
        let err = RouteImport::from_response(&RawResponse::default(), &TravelTimeModel::default())
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::EmptyResult {
                table: "route_station"
            }
        );
    }

    #[test]
    fn weights_are_never_negative() {
        let times = ["23:50", "04:00", "03:59", "12:00", "00:00"];
        let records = times
            .iter()
            .enumerate()
            .map(|(i, t)| stop(i as i64 + 1, "01001", 37.5 + i as f64 * 0.001, t))
            .collect();
        let imp = import(records);
        assert_eq!(imp.edges().len(), 4);
        assert!(imp.edges().iter().all(|e| e.weight() >= 0.0));
    }
}

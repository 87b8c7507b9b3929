//! Station, edge and route storage.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Bound, Edge, Route, RouteId, Station, StationId};
use crate::normalize::RouteImport;

/// Read access to stations and edges by area.
pub trait StationLookup {
    /// Stations inside `bound` (inclusive).
    fn stations_in_bound(&self, bound: &Bound) -> Vec<Station>;

    /// Outgoing edges of `station`; empty for unknown stations.
    fn edges_for_station(&self, station: StationId) -> Vec<Edge>;
}

/// Outcome of [`NetworkStore::insert_route`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertSummary {
    pub route_id: RouteId,
    /// Stations not previously known.
    pub stations_added: usize,
    /// Distinct edges in the store after the insert.
    pub edges_total: usize,
    /// Whether a route with this id was already present.
    pub replaced: bool,
}

/// All imported routes with their stations and edges.
///
/// Stations are shared between routes. The first definition of a station
/// wins; later imports that mention it again leave it untouched. Edges are
/// derived from the stored routes, so re-importing a route replaces its
/// edges instead of adding to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkStore {
    stations: BTreeMap<StationId, Station>,
    routes: BTreeMap<RouteId, Route>,
    edges: BTreeMap<StationId, Vec<Edge>>,
}

impl NetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from stations and routes (as saved in a snapshot).
    pub fn from_parts(stations: Vec<Station>, routes: Vec<Route>) -> Self {
        let mut store = Self::new();
        for station in stations {
            store.stations.entry(station.id()).or_insert(station);
        }
        for route in routes {
            store.routes.insert(route.id, route);
        }
        store.rebuild_edges();
        store
    }

    pub fn insert_route(&mut self, import: RouteImport) -> InsertSummary {
        let route_id = import.route.id;

        let mut stations_added = 0;
        for station in import.stations {
            match self.stations.entry(station.id()) {
                Entry::Vacant(slot) => {
                    slot.insert(station);
                    stations_added += 1;
                }
                Entry::Occupied(_) => {
                    debug!(station = %station, "Station already exists");
                }
            }
        }

        let replaced = self.routes.insert(route_id, import.route).is_some();
        self.rebuild_edges();

        InsertSummary {
            route_id,
            stations_added,
            edges_total: self.edge_count(),
            replaced,
        }
    }

    fn rebuild_edges(&mut self) {
        self.edges.clear();
        for route in self.routes.values() {
            for edge in &route.edges {
                let out = self.edges.entry(edge.start()).or_default();
                // routes sharing a segment produce identical edges
                if !out.contains(edge) {
                    out.push(edge.clone());
                }
            }
        }
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() && self.routes.is_empty()
    }
}

impl StationLookup for NetworkStore {
    fn stations_in_bound(&self, bound: &Bound) -> Vec<Station> {
        self.stations
            .values()
            .filter(|s| bound.contains(s.location()))
            .cloned()
            .collect()
    }

    fn edges_for_station(&self, station: StationId) -> Vec<Edge> {
        self.edges.get(&station).cloned().unwrap_or_default()
    }
}

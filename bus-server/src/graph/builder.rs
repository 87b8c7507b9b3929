//! Graph Builder.
//!
//! Turns stations and their outgoing edges into an adjacency structure.
//! Every call returns a fresh [`Graph`]; nothing is cached or shared between
//! computations.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Edge, Station, StationId};

/// An edge weight with a total order, so it can live in a set.
#[derive(Debug, Clone, Copy)]
pub struct Weight(f64);

impl Weight {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A node of the graph: a station and its outgoing `(neighbor, weight)`
/// pairs.
///
/// Identical pairs collapse. Two edges to the same neighbor with different
/// weights are both kept; relaxation picks the cheaper one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    station: StationId,
    neighbors: BTreeSet<(StationId, Weight)>,
}

impl GraphNode {
    fn new(station: StationId) -> Self {
        Self {
            station,
            neighbors: BTreeSet::new(),
        }
    }

    pub fn station(&self) -> StationId {
        self.station
    }

    pub fn neighbors(&self) -> impl Iterator<Item = (StationId, f64)> + '_ {
        self.neighbors.iter().map(|(id, w)| (*id, w.get()))
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// An edge whose endpoint is not a node of the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingEdge {
    pub from: StationId,
    pub to: StationId,
    pub weight: f64,
}

/// Station graph. Nodes keep insertion order, which is also the shortest-path
/// engine's tie-break order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    index: HashMap<StationId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns `false` if it was already present.
    pub fn add_node(&mut self, station: StationId) -> bool {
        if self.index.contains_key(&station) {
            return false;
        }
        self.index.insert(station, self.nodes.len());
        self.nodes.push(GraphNode::new(station));
        true
    }

    /// Add a directed edge between two existing nodes.
    ///
    /// Returns `Ok(false)` when the identical pair was already present, and
    /// the edge back as a [`DanglingEdge`] when either endpoint is missing.
    /// Weights are not validated here; the engine checks them.
    pub fn add_edge(&mut self, from: StationId, to: StationId, weight: f64) -> Result<bool, DanglingEdge> {
        let dangling = DanglingEdge { from, to, weight };
        if !self.index.contains_key(&to) {
            return Err(dangling);
        }
        match self.index.get(&from) {
            Some(&i) => Ok(self.nodes[i].neighbors.insert((to, Weight::new(weight)))),
            None => Err(dangling),
        }
    }

    pub fn contains(&self, station: StationId) -> bool {
        self.index.contains_key(&station)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(GraphNode::degree).sum()
    }

    pub fn node(&self, station: StationId) -> Option<&GraphNode> {
        self.position(station).map(|i| &self.nodes[i])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Insertion index of a station.
    pub fn position(&self, station: StationId) -> Option<usize> {
        self.index.get(&station).copied()
    }
}

/// A station together with its outgoing edges, as loaded from a
/// station-lookup collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct StationWithEdges {
    pub station: Station,
    pub edges: Vec<Edge>,
}

impl StationWithEdges {
    pub fn new(station: Station, edges: Vec<Edge>) -> Self {
        Self { station, edges }
    }
}

/// What [`build_graph`] had to leave out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    /// Edges whose end station is not among the inputs.
    pub dropped: Vec<DanglingEdge>,
    /// Identical `(neighbor, weight)` pairs merged into one.
    pub duplicates_collapsed: usize,
}

/// A graph plus its [`BuildReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltGraph {
    pub graph: Graph,
    pub report: BuildReport,
}

/// Build a graph from stations and their outgoing edges.
///
/// Each input's edges are attached to that input's station, using the
/// edge's end as neighbor. Edges to stations outside the input are dropped,
/// logged and recorded in the report; they are not an error, since a
/// station near the edge of a query area naturally links outside it.
/// Input stations are not modified.
pub fn build_graph(stations: &[StationWithEdges]) -> BuiltGraph {
    let mut graph = Graph::new();
    let mut report = BuildReport::default();

    for entry in stations {
        graph.add_node(entry.station.id());
    }

    for entry in stations {
        let from = entry.station.id();
        for edge in &entry.edges {
            match graph.add_edge(from, edge.end(), edge.weight()) {
                Ok(true) => {}
                Ok(false) => report.duplicates_collapsed += 1,
                Err(dangling) => {
                    warn!(
                        from = %dangling.from,
                        to = %dangling.to,
                        "Dropping edge to station outside the graph"
                    );
                    report.dropped.push(dangling);
                }
            }
        }
    }

    debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        dropped = report.dropped.len(),
        "Built graph"
    );

    BuiltGraph { graph, report }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> StationId {
        StationId::new(n)
    }

    fn station(n: i64) -> Station {
        Station::new(id(n), Some(n as u32), format!("정류소{n}"), 37.5, 127.0 + n as f64 * 0.001)
            .unwrap()
    }

    fn with_edges(n: i64, edges: &[(i64, f64)]) -> StationWithEdges {
        StationWithEdges::new(
            station(n),
            edges
                .iter()
                .map(|&(to, w)| Edge::new(id(n), id(to), w).unwrap())
                .collect(),
        )
    }

    #[test]
    fn nodes_keep_insertion_order() {
        let built = build_graph(&[with_edges(3, &[]), with_edges(1, &[]), with_edges(2, &[])]);
        let order: Vec<_> = built.graph.nodes().iter().map(GraphNode::station).collect();
        assert_eq!(order, vec![id(3), id(1), id(2)]);
        assert_eq!(built.graph.position(id(1)), Some(1));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let built = build_graph(&[
            with_edges(1, &[(2, 60.0), (2, 60.0)]),
            with_edges(2, &[]),
        ]);
        let neighbors: Vec<_> = built.graph.node(id(1)).unwrap().neighbors().collect();
        assert_eq!(neighbors, vec![(id(2), 60.0)]);
        assert_eq!(built.report.duplicates_collapsed, 1);
    }

    #[test]
    fn different_weights_to_same_neighbor_both_kept() {
        let built = build_graph(&[
            with_edges(1, &[(2, 90.0), (2, 60.0)]),
            with_edges(2, &[]),
        ]);
        let neighbors: Vec<_> = built.graph.node(id(1)).unwrap().neighbors().collect();
        assert_eq!(neighbors, vec![(id(2), 60.0), (id(2), 90.0)]);
    }

    #[test]
    fn dangling_edge_is_dropped_and_reported() {
        let built = build_graph(&[with_edges(1, &[(2, 60.0), (99, 30.0)]), with_edges(2, &[])]);

        assert_eq!(built.graph.edge_count(), 1);
        assert_eq!(
            built.report.dropped,
            vec![DanglingEdge {
                from: id(1),
                to: id(99),
                weight: 30.0
            }]
        );
    }

    #[test]
    fn edges_may_point_forward_in_input_order() {
        let built = build_graph(&[with_edges(1, &[(2, 5.0)]), with_edges(2, &[(1, 5.0)])]);
        assert!(built.report.dropped.is_empty());
        assert_eq!(built.graph.edge_count(), 2);
    }

    #[test]
    fn add_edge_requires_both_endpoints() {
        let mut graph = Graph::new();
        graph.add_node(id(1));
        assert!(graph.add_edge(id(1), id(2), 1.0).is_err());
        assert!(graph.add_edge(id(2), id(1), 1.0).is_err());
        assert!(!graph.add_node(id(1)));
    }

    #[test]
    fn build_is_idempotent() {
        let input = [
            with_edges(1, &[(2, 5.0), (3, 10.0)]),
            with_edges(2, &[(3, 3.0)]),
            with_edges(3, &[(4, 1.0)]),
        ];
        let a = build_graph(&input);
        let b = build_graph(&input);
        assert_eq!(a, b);
    }
}

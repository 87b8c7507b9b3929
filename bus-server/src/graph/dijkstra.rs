//! Shortest-Path Engine.
//!
//! Single-source Dijkstra with linear-scan selection: each round scans the
//! unsettled nodes for the minimum cost, so a run is O(V²). That is fine for
//! the few hundred stations in a planning area; callers should cap the graph
//! size (see [`shortest_paths_bounded`]). A heap-based selection would scale
//! further, but must keep the relaxation rule and tie-break described below.
//!
//! Cost and predecessor state is allocated per call. The graph is only read,
//! so concurrent runs over one graph are independent.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::StationId;

use super::builder::Graph;
use super::error::PathError;

/// Result of a shortest-path run: the cost of and predecessor on the best
/// path to every node of the graph.
///
/// Unreachable nodes have cost `+∞` and no predecessor. The source has cost
/// `0` and no predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    source: StationId,
    cost: HashMap<StationId, f64>,
    predecessor: HashMap<StationId, Option<StationId>>,
}

impl ShortestPaths {
    pub fn source(&self) -> StationId {
        self.source
    }

    /// Cost of the best path to `station`, `None` if it is not in the graph.
    pub fn cost(&self, station: StationId) -> Option<f64> {
        self.cost.get(&station).copied()
    }

    pub fn predecessor(&self, station: StationId) -> Option<StationId> {
        self.predecessor.get(&station).copied().flatten()
    }

    pub fn is_reachable(&self, station: StationId) -> bool {
        self.cost(station).is_some_and(f64::is_finite)
    }

    pub fn costs(&self) -> &HashMap<StationId, f64> {
        &self.cost
    }

    pub fn predecessors(&self) -> &HashMap<StationId, Option<StationId>> {
        &self.predecessor
    }

    /// Stations from the source to `target`, or empty if unreachable.
    pub fn path_to(&self, target: StationId) -> Vec<StationId> {
        reconstruct_path(&self.predecessor, self.source, target)
    }

    pub fn into_maps(
        self,
    ) -> (
        HashMap<StationId, f64>,
        HashMap<StationId, Option<StationId>>,
    ) {
        (self.cost, self.predecessor)
    }
}

/// Minimum-cost paths from `source` to every node of `graph`.
///
/// Fails with [`PathError::InvalidSource`] if `source` is not a node, and
/// with [`PathError::NegativeWeight`] if any edge weight is negative or NaN;
/// weights are checked before any work is done.
///
/// When several unsettled nodes share the minimum cost, the one inserted
/// into the graph first is settled first. This order is an implementation
/// detail and only affects which of several equal-cost paths is reported.
pub fn shortest_paths(graph: &Graph, source: StationId) -> Result<ShortestPaths, PathError> {
    let source_idx = graph
        .position(source)
        .ok_or(PathError::InvalidSource(source))?;
    validate_weights(graph)?;

    let nodes = graph.nodes();
    let n = nodes.len();

    let mut cost = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    cost[source_idx] = 0.0;

    let mut unsettled: Vec<usize> = (0..n).collect();
    let mut settled = 0;

    while !unsettled.is_empty() {
        // Strict `<` keeps the earliest-inserted node on ties.
        let mut best = 0;
        for (i, &node) in unsettled.iter().enumerate().skip(1) {
            if cost[node] < cost[unsettled[best]] {
                best = i;
            }
        }
        let u = unsettled.remove(best);

        // Everything left is unreachable; relaxing from +∞ changes nothing.
        if cost[u].is_infinite() {
            break;
        }
        settled += 1;

        for (neighbor, weight) in nodes[u].neighbors() {
            let Some(v) = graph.position(neighbor) else {
                continue;
            };
            let candidate = cost[u] + weight;
            if candidate < cost[v] {
                cost[v] = candidate;
                predecessor[v] = Some(u);
            }
        }
    }

    debug!(%source, nodes = n, settled, "Computed shortest paths");

    let station = |i: usize| nodes[i].station();
    Ok(ShortestPaths {
        source,
        cost: (0..n).map(|i| (station(i), cost[i])).collect(),
        predecessor: (0..n)
            .map(|i| (station(i), predecessor[i].map(station)))
            .collect(),
    })
}

/// [`shortest_paths`] with a cap on the number of nodes.
pub fn shortest_paths_bounded(
    graph: &Graph,
    source: StationId,
    max_nodes: usize,
) -> Result<ShortestPaths, PathError> {
    if graph.len() > max_nodes {
        return Err(PathError::GraphTooLarge {
            nodes: graph.len(),
            limit: max_nodes,
        });
    }
    shortest_paths(graph, source)
}

fn validate_weights(graph: &Graph) -> Result<(), PathError> {
    for node in graph.nodes() {
        for (to, weight) in node.neighbors() {
            // also catches NaN
            if !(weight >= 0.0) {
                return Err(PathError::NegativeWeight {
                    from: node.station(),
                    to,
                    weight,
                });
            }
        }
    }
    Ok(())
}

/// Walk predecessor links back from `target` to `source`.
///
/// Returns the path in travel order, `[source]` when `target == source`, and
/// an empty path when `target` is unreachable or unknown. The walk gives up
/// after as many steps as there are nodes, so a corrupt map with a cycle
/// yields an empty path instead of looping.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use bus_server::domain::StationId;
/// use bus_server::graph::reconstruct_path;
///
/// let (a, b, c) = (StationId::new(1), StationId::new(2), StationId::new(3));
/// let pred = HashMap::from([(a, None), (b, Some(a)), (c, Some(b))]);
/// assert_eq!(reconstruct_path(&pred, a, c), vec![a, b, c]);
/// ```
pub fn reconstruct_path(
    predecessor: &HashMap<StationId, Option<StationId>>,
    source: StationId,
    target: StationId,
) -> Vec<StationId> {
    if !predecessor.contains_key(&target) {
        return Vec::new();
    }

    let mut path = vec![target];
    let mut current = target;
    for _ in 0..predecessor.len() {
        if current == source {
            path.reverse();
            return path;
        }
        match predecessor.get(&current).copied().flatten() {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }

    Vec::new()
}

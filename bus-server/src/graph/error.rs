//! Shortest-path error types.

use crate::domain::StationId;

/// Precondition violations that abort a shortest-path computation.
///
/// No partial result is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    /// The source station is not a node of the graph.
    #[error("source station {0} is not in the graph")]
    InvalidSource(StationId),

    /// An edge weight is negative or NaN.
    #[error("edge {from} -> {to} has invalid weight {weight}")]
    NegativeWeight {
        from: StationId,
        to: StationId,
        weight: f64,
    },

    /// The graph exceeds the caller's node cap.
    #[error("graph has {nodes} nodes, limit is {limit}")]
    GraphTooLarge { nodes: usize, limit: usize },
}

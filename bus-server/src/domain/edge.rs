//! Directed, weighted connections between stations.

use serde::{Deserialize, Serialize};

use super::station::StationId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidEdge {
    #[error("edge {start} -> {end} has negative weight {weight}")]
    NegativeWeight {
        start: StationId,
        end: StationId,
        weight: f64,
    },

    #[error("edge {start} -> {end} has non-finite weight")]
    NonFiniteWeight { start: StationId, end: StationId },
}

/// A directed edge between consecutive stations of a route.
///
/// The weight is an estimated travel time in seconds and is always finite
/// and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EdgeFields")]
pub struct Edge {
    start: StationId,
    end: StationId,
    weight: f64,
}

impl Edge {
    pub fn new(start: StationId, end: StationId, weight: f64) -> Result<Self, InvalidEdge> {
        if !weight.is_finite() {
            return Err(InvalidEdge::NonFiniteWeight { start, end });
        }
        if weight < 0.0 {
            return Err(InvalidEdge::NegativeWeight { start, end, weight });
        }
        Ok(Self { start, end, weight })
    }

    pub fn start(&self) -> StationId {
        self.start
    }

    pub fn end(&self) -> StationId {
        self.end
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

#[derive(Deserialize)]
struct EdgeFields {
    start: StationId,
    end: StationId,
    weight: f64,
}

impl TryFrom<EdgeFields> for Edge {
    type Error = InvalidEdge;

    fn try_from(fields: EdgeFields) -> Result<Self, Self::Error> {
        Edge::new(fields.start, fields.end, fields.weight)
    }
}

//! Station graph and shortest paths.
//!
//! [`build_graph`] turns stations with their outgoing edges into a fresh
//! [`Graph`]; [`shortest_paths`] runs Dijkstra over it and
//! [`reconstruct_path`] turns the predecessor map into a station sequence.

mod builder;
mod dijkstra;
mod error;


pub use builder::{
    BuildReport, BuiltGraph, DanglingEdge, Graph, GraphNode, StationWithEdges, Weight, build_graph,
};
pub use dijkstra::{ShortestPaths, reconstruct_path, shortest_paths, shortest_paths_bounded};
pub use error::PathError;

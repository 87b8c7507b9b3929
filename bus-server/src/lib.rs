//! Bus transit proxy server.
//!
//! Proxies the Seoul bus information service, normalizing its loosely
//! typed responses, and plans journeys over the routes it has imported
//! by running a shortest-path search on a graph of stops.

pub mod bus_api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod graph;
pub mod network;
pub mod normalize;
pub mod planner;
pub mod web;

//! Domain types for the bus network.
//!
//! Stations, edges and routes as they are used by the graph builder and the
//! shortest-path engine. Constructors enforce the invariants the engine relies
//! on (coordinates in range, non-negative weights), so code receiving these
//! types can trust them.

mod edge;
mod location;
mod route;
mod station;
mod time;
mod travel;

pub use edge::{Edge, InvalidEdge};
pub use location::{Bound, GeoPoint, great_circle_distance, meters_to_degrees_approx};
pub use route::{Route, RouteId, RouteType};
pub use station::{InvalidStation, Station, StationId};
pub use time::{ClockTime, TimeError};
pub use travel::{TravelTimeModel, estimate_travel_time};

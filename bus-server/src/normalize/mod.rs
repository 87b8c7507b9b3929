//! Entity Normalizer.
//!
//! The provider returns flat records of string-typed fields with
//! inconsistent key names across endpoints (`stationNo` vs `arsId`,
//! `beginTm` vs `firstTm`). This module maps them to consistently named,
//! typed values using declarative [`FieldTable`]s, and builds typed
//! [`Route`](crate::domain::Route)s, stations and edges from route responses.
//!
//! Malformed numeric strings are handled by explicit per-field policy, never
//! by a parse failure escaping.

mod error;
mod field;
mod import;
mod list;
mod tables;

pub use error::NormalizeError;
pub use field::{
    Conversion, Fallback, FieldSpec, FieldTable, FieldValue, NormalizedRecord, Policy, normalize,
};
pub use import::{RejectedStation, RouteImport};
pub use list::{NormalizedList, normalize_list};
pub use tables::{NEARBY_STATION, ROUTE_STATION, STATION_ROUTE};

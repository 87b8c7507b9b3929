//! Client for the municipal bus information provider.
//!
//! Three form-encoded POST endpoints are used:
//! - `getStationByPos.bms`: stops within a radius of a point
//! - `getRouteAndPos.bms`: the ordered stops of one route
//! - `getStationByUid.bms`: the routes serving one stop
//!
//! Every response has the same envelope, an `error` status block plus a
//! `resultList` of flat records whose values are mostly strings. Records are
//! kept as raw JSON maps here; typing them is the job of
//! [`crate::normalize`].

mod client;
mod error;
mod types;

pub use client::{BusApiClient, BusApiConfig, format_ars_id};
pub use error::BusApiError;
pub use types::{NO_RESULT_CODE, RawRecord, RawResponse, SUCCESS_CODE, UpstreamStatus};

//! Bus routes and their categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::edge::Edge;
use super::station::StationId;

/// Upstream route identifier (`busRouteId`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(i64);

impl RouteId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Route category as coded by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum RouteType {
    Shared,
    Airport,
    Trunk,
    Branch,
    Circular,
    /// Wide-area express.
    Express,
    Incheon,
    Gyeonggi,
    Discontinued,
    Other(u8),
}

impl RouteType {
    pub fn code(self) -> u8 {
        match self {
            RouteType::Shared => 0,
            RouteType::Airport => 1,
            RouteType::Trunk => 3,
            RouteType::Branch => 4,
            RouteType::Circular => 5,
            RouteType::Express => 6,
            RouteType::Incheon => 7,
            RouteType::Gyeonggi => 8,
            RouteType::Discontinued => 9,
            RouteType::Other(code) => code,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RouteType::Shared => "shared",
            RouteType::Airport => "airport",
            RouteType::Trunk => "trunk",
            RouteType::Branch => "branch",
            RouteType::Circular => "circular",
            RouteType::Express => "express",
            RouteType::Incheon => "incheon",
            RouteType::Gyeonggi => "gyeonggi",
            RouteType::Discontinued => "discontinued",
            RouteType::Other(_) => "other",
        }
    }
}

impl From<u8> for RouteType {
    fn from(code: u8) -> Self {
        match code {
            0 => RouteType::Shared,
            1 => RouteType::Airport,
            3 => RouteType::Trunk,
            4 => RouteType::Branch,
            5 => RouteType::Circular,
            6 => RouteType::Express,
            7 => RouteType::Incheon,
            8 => RouteType::Gyeonggi,
            9 => RouteType::Discontinued,
            other => RouteType::Other(other),
        }
    }
}

impl From<RouteType> for u8 {
    fn from(route_type: RouteType) -> Self {
        route_type.code()
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An ordered bus line.
///
/// Stations are referenced by id; the same station may belong to many
/// routes. `raw` keeps the provider's payload for reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub number: String,
    /// `None` when the provider omitted the code.
    pub route_type: Option<RouteType>,
    pub stations: Vec<StationId>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_type_codes() {
        assert_eq!(RouteType::from(3), RouteType::Trunk);
        assert_eq!(RouteType::from(0), RouteType::Shared);
        assert_eq!(RouteType::from(2), RouteType::Other(2));
        assert_eq!(RouteType::from(42).code(), 42);
        for code in 0u8..=10 {
            assert_eq!(RouteType::from(code).code(), code);
        }
    }

    #[test]
    fn route_type_serializes_as_code() {
        assert_eq!(serde_json::to_string(&RouteType::Branch).unwrap(), "4");
        let t: RouteType = serde_json::from_str("6").unwrap();
        assert_eq!(t, RouteType::Express);
        assert_eq!(t.to_string(), "express");
    }

    #[test]
    fn route_id_formatting() {
        let id = RouteId::new(100100118);
        assert_eq!(id.to_string(), "100100118");
        assert_eq!(format!("{id:?}"), "RouteId(100100118)");
    }
}

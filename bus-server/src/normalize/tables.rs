//! Field tables for the three provider endpoints.

use super::field::Conversion::{Clock, Float, Integer, Text};
use super::field::{FieldSpec, FieldTable};

/// `getStationByPos.bms`: stops near a point.
pub const NEARBY_STATION: FieldTable = FieldTable {
    name: "nearby_station",
    fields: &[
        FieldSpec::required("stationId", "station_id", Integer),
        // "0" for stops without a public code
        FieldSpec::lenient("arsId", "ars_id", Integer),
        FieldSpec::optional("stationNm", "station_name", Text),
        FieldSpec::required("gpsY", "latitude", Float),
        FieldSpec::required("gpsX", "longitude", Float),
        FieldSpec::lenient("dist", "distance_from_current_location", Integer),
    ],
    aggregates: &[],
};

/// `getRouteAndPos.bms`: the ordered stops of a route.
pub const ROUTE_STATION: FieldTable = FieldTable {
    name: "route_station",
    fields: &[
        FieldSpec::required("busRouteId", "route_id", Integer),
        FieldSpec::optional("busRouteNm", "route_number", Text),
        FieldSpec::lenient("routeType", "route_type", Integer),
        FieldSpec::lenient("seq", "sequence", Integer),
        FieldSpec::required("station", "station_id", Integer),
        // "미정차" when the bus passes without stopping
        FieldSpec::lenient("stationNo", "ars_id", Integer),
        FieldSpec::optional("stationNm", "station_name", Text),
        FieldSpec::required("gpsY", "latitude", Float),
        FieldSpec::required("gpsX", "longitude", Float),
        FieldSpec::lenient("beginTm", "first_departure", Clock),
        FieldSpec::lenient("lastTm", "last_departure", Clock),
        FieldSpec::optional("direction", "direction", Text),
    ],
    aggregates: &["route_id", "route_number", "latitude", "longitude"],
};

/// `getStationByUid.bms`: the routes serving a stop.
pub const STATION_ROUTE: FieldTable = FieldTable {
    name: "station_route",
    fields: &[
        FieldSpec::required("busRouteId", "route_id", Integer),
        FieldSpec::optional("rtNm", "route_number", Text),
        FieldSpec::lenient("routeType", "route_type", Integer),
        FieldSpec::lenient("arsId", "ars_id", Integer),
        FieldSpec::lenient("stId", "station_id", Integer),
        FieldSpec::optional("stNm", "station_name", Text),
        FieldSpec::optional("adirection", "direction", Text),
        FieldSpec::lenient("firstTm", "first_departure", Clock),
        FieldSpec::lenient("lastTm", "last_departure", Clock),
        FieldSpec::required("gpsY", "latitude", Float),
        FieldSpec::required("gpsX", "longitude", Float),
    ],
    aggregates: &["latitude", "longitude"],
};

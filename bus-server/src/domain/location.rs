//! Geographic points, bounds and great-circle distance.
//!
//! Distances use the geodesic (Karney) algorithm from the `geo` crate, which
//! agrees with Vincenty to well under a millimetre at city scale.

use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

/// Metres per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        great_circle_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    fn to_point(self) -> Point<f64> {
        // geo points are (x = longitude, y = latitude)
        Point::new(self.longitude, self.latitude)
    }
}

/// Geodesic distance between two coordinates, in metres.
///
/// # Examples
///
/// ```
/// use bus_server::domain::great_circle_distance;
///
/// // Gangnam station to Seoul City Hall is roughly 8.9 km.
/// let d = great_circle_distance(37.4979, 127.0276, 37.5663, 126.9779);
/// assert!((d - 8_900.0).abs() < 300.0);
/// ```
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    GeoPoint::new(lat1, lon1)
        .to_point()
        .geodesic_distance(&GeoPoint::new(lat2, lon2).to_point())
}

/// Convert metres to degrees of latitude (approximate, for bounding boxes).
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// An inclusive south-west / north-east rectangle.
///
/// No antimeridian handling: a bound with `sw.longitude > ne.longitude`
/// contains nothing. The dataset never needs it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub sw: GeoPoint,
    pub ne: GeoPoint,
}

impl Bound {
    pub fn new(sw_latitude: f64, sw_longitude: f64, ne_latitude: f64, ne_longitude: f64) -> Self {
        Self {
            sw: GeoPoint::new(sw_latitude, sw_longitude),
            ne: GeoPoint::new(ne_latitude, ne_longitude),
        }
    }

    /// Smallest bound containing every point, grown by `margin_m` metres on
    /// each side. Returns `None` for an empty slice.
    pub fn around(points: &[GeoPoint], margin_m: f64) -> Option<Self> {
        let first = points.first()?;
        let mut sw = *first;
        let mut ne = *first;
        for p in &points[1..] {
            sw.latitude = sw.latitude.min(p.latitude);
            sw.longitude = sw.longitude.min(p.longitude);
            ne.latitude = ne.latitude.max(p.latitude);
            ne.longitude = ne.longitude.max(p.longitude);
        }

        let lat_margin = meters_to_degrees_approx(margin_m);
        // A degree of longitude shrinks with cos(latitude); use the widest
        // latitude so the margin is never too small.
        let widest = sw.latitude.abs().max(ne.latitude.abs()).to_radians().cos();
        let lon_margin = if widest > f64::EPSILON {
            lat_margin / widest
        } else {
            lat_margin
        };

        Some(Self {
            sw: GeoPoint::new(sw.latitude - lat_margin, sw.longitude - lon_margin),
            ne: GeoPoint::new(ne.latitude + lat_margin, ne.longitude + lon_margin),
        })
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        self.sw.latitude <= point.latitude
            && point.latitude <= self.ne.latitude
            && self.sw.longitude <= point.longitude
            && point.longitude <= self.ne.longitude
    }
}

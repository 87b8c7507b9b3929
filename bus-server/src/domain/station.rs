//! Station identity and validated station records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::GeoPoint;

/// Reasons a raw station cannot become a [`Station`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidStation {
    /// The public stop code is `0`, which the provider uses for
    /// "the bus does not actually stop here".
    #[error("station {0} has public code 0 (not a stop)")]
    NotStopping(StationId),

    #[error("latitude {0} is outside [0, 90)")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [0, 180)")]
    LongitudeOutOfRange(f64),
}

/// Stable upstream identifier of a station.
///
/// # Examples
///
/// ```
/// use bus_server::domain::StationId;
///
/// let id = StationId::new(35680);
/// assert_eq!(id.get(), 35680);
/// assert_eq!(id.to_string(), "35680");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(i64);

impl StationId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical bus stop.
///
/// Coordinates are restricted to `0 <= latitude < 90` and
/// `0 <= longitude < 180`. This is a property of the provider's dataset
/// (Seoul metropolitan area, northern/eastern hemisphere), not a general
/// rule of geography; stations outside it are rejected at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StationFields")]
pub struct Station {
    id: StationId,
    /// Public stop code (`arsId`), absent when the provider reports a
    /// placeholder such as "미정차" (not yet stopping).
    number: Option<u32>,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl Station {
    /// Create a validated station.
    ///
    /// Fails with [`InvalidStation::NotStopping`] when the public code is
    /// `Some(0)`, and with an out-of-range error when the coordinates fall
    /// outside the dataset's bounds. NaN coordinates are out of range.
    pub fn new(
        id: StationId,
        number: Option<u32>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, InvalidStation> {
        if number == Some(0) {
            return Err(InvalidStation::NotStopping(id));
        }
        check_coordinates(latitude, longitude)?;

        Ok(Self {
            id,
            number,
            name: name.into(),
            latitude,
            longitude,
        })
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Great-circle distance from this station to `point`, in metres.
    pub fn distance_to(&self, point: GeoPoint) -> f64 {
        self.location().distance_m(point)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), InvalidStation> {
    if !(0.0..90.0).contains(&latitude) {
        return Err(InvalidStation::LatitudeOutOfRange(latitude));
    }
    if !(0.0..180.0).contains(&longitude) {
        return Err(InvalidStation::LongitudeOutOfRange(longitude));
    }
    Ok(())
}

/// Unvalidated mirror of [`Station`] used when deserializing snapshots.
#[derive(Deserialize)]
struct StationFields {
    id: StationId,
    number: Option<u32>,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<StationFields> for Station {
    type Error = InvalidStation;

    fn try_from(fields: StationFields) -> Result<Self, Self::Error> {
        Station::new(
            fields.id,
            fields.number,
            fields.name,
            fields.latitude,
            fields.longitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> StationId {
        StationId::new(n)
    }

    #[test]
    fn valid_station() {
        let s = Station::new(id(35680), Some(47171), "구미동차고지앞", 37.342, 127.106).unwrap();
        assert_eq!(s.id(), id(35680));
        assert_eq!(s.number(), Some(47171));
        assert_eq!(s.name(), "구미동차고지앞");
        assert_eq!(s.location(), GeoPoint::new(37.342, 127.106));
    }

    #[test]
    fn missing_number_is_allowed() {
        let s = Station::new(id(1), None, "미정차 정류소", 37.5, 127.0).unwrap();
        assert_eq!(s.number(), None);
    }

    #[test]
    fn zero_number_is_rejected() {
        let err = Station::new(id(7), Some(0), "ghost", 37.5, 127.0).unwrap_err();
        assert_eq!(err, InvalidStation::NotStopping(id(7)));
    }

    #[test]
    fn coordinate_bounds() {
        assert!(Station::new(id(1), None, "a", 0.0, 0.0).is_ok());
        assert!(Station::new(id(1), None, "a", 89.999, 179.999).is_ok());

        assert_eq!(
            Station::new(id(1), None, "a", 90.0, 127.0).unwrap_err(),
            InvalidStation::LatitudeOutOfRange(90.0)
        );
        assert_eq!(
            Station::new(id(1), None, "a", -0.5, 127.0).unwrap_err(),
            InvalidStation::LatitudeOutOfRange(-0.5)
        );
        assert_eq!(
            Station::new(id(1), None, "a", 37.0, 180.0).unwrap_err(),
            InvalidStation::LongitudeOutOfRange(180.0)
        );
        assert!(Station::new(id(1), None, "a", f64::NAN, 127.0).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok = r#"{"id":1,"number":null,"name":"a","latitude":37.5,"longitude":127.0}"#;
        assert!(serde_json::from_str::<Station>(ok).is_ok());

        let zero = r#"{"id":1,"number":0,"name":"a","latitude":37.5,"longitude":127.0}"#;
        assert!(serde_json::from_str::<Station>(zero).is_err());

        let south = r#"{"id":1,"number":5,"name":"a","latitude":-33.8,"longitude":151.2}"#;
        assert!(serde_json::from_str::<Station>(south).is_err());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(format!("{:?}", id(12)), "StationId(12)");
        let s = Station::new(id(12), None, "Gangnam", 37.49, 127.02).unwrap();
        assert_eq!(s.to_string(), "Gangnam (12)");
    }
}

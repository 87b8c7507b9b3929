//! Edge weights: estimated travel time between consecutive stops.
//!
//! The provider gives each stop on a route its first departure of the day.
//! The difference between two consecutive stops is a usable estimate of the
//! ride between them, except when the schedule wraps past midnight and the
//! difference goes negative. Those deltas are replaced by a fixed fallback.
//! This is an approximation, not exact scheduling data.

use tracing::debug;

use super::station::Station;
use super::time::ClockTime;

/// Travel-time estimation tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeModel {
    /// Seconds used when the departure-time delta is negative.
    pub negative_delta_fallback_secs: u32,
    /// Assumed bus speed for distance-derived placeholder costs.
    pub placeholder_speed_mps: f64,
}

impl TravelTimeModel {
    pub const DEFAULT_FALLBACK_SECS: u32 = 150;
    /// 20 km/h, a typical urban bus average including dwell time.
    pub const DEFAULT_PLACEHOLDER_SPEED_MPS: f64 = 20_000.0 / 3600.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback_secs(mut self, secs: u32) -> Self {
        self.negative_delta_fallback_secs = secs;
        self
    }

    pub fn with_placeholder_speed(mut self, metres_per_second: f64) -> Self {
        self.placeholder_speed_mps = metres_per_second;
        self
    }

    /// Seconds from `first` to `second`; never negative.
    pub fn estimate_travel_time(&self, first: ClockTime, second: ClockTime) -> f64 {
        let delta = second.seconds_since(first);
        if delta < 0 {
            debug!(
                from = %first,
                to = %second,
                fallback = self.negative_delta_fallback_secs,
                "Negative departure delta, using fallback"
            );
            f64::from(self.negative_delta_fallback_secs)
        } else {
            delta as f64
        }
    }

    /// Distance-derived cost in seconds, used when no schedule times exist.
    pub fn placeholder_cost(&self, from: &Station, to: &Station) -> f64 {
        let metres = from.distance_to(to.location());
        if self.placeholder_speed_mps > 0.0 {
            metres / self.placeholder_speed_mps
        } else {
            metres
        }
    }

    /// Weight of the edge from `prev` to `next`, preferring schedule times
    /// and falling back to the great-circle placeholder.
    pub fn edge_weight(
        &self,
        prev: &Station,
        prev_departure: Option<ClockTime>,
        next: &Station,
        next_departure: Option<ClockTime>,
    ) -> f64 {
        match (prev_departure, next_departure) {
            (Some(a), Some(b)) => self.estimate_travel_time(a, b),
            _ => self.placeholder_cost(prev, next),
        }
    }
}

impl Default for TravelTimeModel {
    fn default() -> Self {
        Self {
            negative_delta_fallback_secs: Self::DEFAULT_FALLBACK_SECS,
            placeholder_speed_mps: Self::DEFAULT_PLACEHOLDER_SPEED_MPS,
        }
    }
}

/// [`TravelTimeModel::estimate_travel_time`] with the default model.
///
/// # Examples
///
/// ```
/// use bus_server::domain::{ClockTime, estimate_travel_time};
///
/// let a = ClockTime::parse_hhmm("05:00").unwrap();
/// let b = ClockTime::parse_hhmm("05:02").unwrap();
/// assert_eq!(estimate_travel_time(a, b), 120.0);
/// // wraps past midnight
/// assert_eq!(estimate_travel_time(b, a), 150.0);
/// ```
pub fn estimate_travel_time(first: ClockTime, second: ClockTime) -> f64 {
    TravelTimeModel::default().estimate_travel_time(first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use approx::assert_relative_eq;

    fn time(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    fn station(id: i64, lat: f64, lon: f64) -> Station {
        Station::new(StationId::new(id), None, format!("s{id}"), lat, lon).unwrap()
    }

    #[test]
    fn forward_delta() {
        assert_eq!(estimate_travel_time(time("04:30"), time("04:33")), 180.0);
        assert_eq!(estimate_travel_time(time("04:30"), time("04:30")), 0.0);
    }

    #[test]
    fn midnight_wrap_uses_fallback() {
        assert_eq!(estimate_travel_time(time("23:55"), time("00:05")), 150.0);
    }

    #[test]
    fn fallback_is_tunable() {
        let model = TravelTimeModel::new().with_fallback_secs(59);
        assert_eq!(model.estimate_travel_time(time("23:55"), time("00:05")), 59.0);
    }

    #[test]
    fn placeholder_cost_scales_with_distance() {
        let model = TravelTimeModel::new().with_placeholder_speed(10.0);
        let a = station(1, 37.0, 127.0);
        let b = station(2, 37.01, 127.0);
        let metres = a.distance_to(b.location());
        assert_relative_eq!(model.placeholder_cost(&a, &b), metres / 10.0, epsilon = 1e-9);
    }

    #[test]
    fn edge_weight_prefers_schedule() {
        let model = TravelTimeModel::default();
        let a = station(1, 37.0, 127.0);
        let b = station(2, 37.01, 127.0);

        assert_eq!(
            model.edge_weight(&a, Some(time("05:00")), &b, Some(time("05:04"))),
            240.0
        );
        let placeholder = model.edge_weight(&a, Some(time("05:00")), &b, None);
        assert_relative_eq!(placeholder, model.placeholder_cost(&a, &b));
    }
}

//! Wall-clock times from the provider.
//!
//! Route records carry the first and last departure of the day at each stop
//! as "HH:MM" strings, sometimes with trailing spaces ("04:30 "). They have
//! no date, so subtraction between two of them can go negative when a
//! schedule wraps past midnight.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute precision.
///
/// # Examples
///
/// ```
/// use bus_server::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("04:30 ").unwrap();
/// assert_eq!(t.to_string(), "04:30");
/// assert!(ClockTime::parse_hhmm("4:30").is_err());
/// assert!(ClockTime::parse_hhmm("24:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse "HH:MM", ignoring surrounding whitespace.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new("invalid time"))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Seconds from `earlier` to `self`, negative if `self` is earlier in
    /// the day. No midnight wrap is applied.
    pub fn seconds_since(&self, earlier: ClockTime) -> i64 {
        self.0.signed_duration_since(earlier.0).num_seconds()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = ClockTime::parse_hhmm("00:00").unwrap();
        assert_eq!((t.hour(), t.minute()), (0, 0));

        let t = ClockTime::parse_hhmm("23:59").unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        assert_eq!(
            ClockTime::parse_hhmm("04:30 ").unwrap(),
            ClockTime::from_hm(4, 30).unwrap()
        );
        assert!(ClockTime::parse_hhmm(" 23:00").is_ok());
    }

    #[test]
    fn parse_invalid_format() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("1430").is_err());
        assert!(ClockTime::parse_hhmm("14-30").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm("미정").is_err());
    }

    #[test]
    fn seconds_since_is_signed() {
        let a = ClockTime::parse_hhmm("23:55").unwrap();
        let b = ClockTime::parse_hhmm("00:05").unwrap();
        assert_eq!(b.seconds_since(a), -(23 * 3600 + 50 * 60));
        assert_eq!(a.seconds_since(b), 23 * 3600 + 50 * 60);
        assert_eq!(a.seconds_since(a), 0);
    }

    #[test]
    fn serializes_as_string() {
        let t = ClockTime::parse_hhmm("09:05").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:05\"");
        assert_eq!(format!("{t:?}"), "ClockTime(09:05)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn display_roundtrip(h in 0u32..24, m in 0u32..60) {
            let t = ClockTime::from_hm(h, m).unwrap();
            prop_assert_eq!(ClockTime::parse_hhmm(&t.to_string()).unwrap(), t);
        }
    }
}

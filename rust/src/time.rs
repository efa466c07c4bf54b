//! Wall-clock time labels measured in whole minutes since midnight.
//!
//! All schedule arithmetic happens on the integer minute count. Converting to
//! `H:MM AM/PM` is a display step only. There is no date and no timezone.

use chrono::{NaiveTime, Timelike};
use pyo3::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when a time-of-day string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    input: String,
}

impl TimeParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid time of day: {:?}", self.input)
    }
}

impl std::error::Error for TimeParseError {}

/// A wall-clock label, stored as minutes since midnight.
///
/// Values past `23:59` are kept as-is (a long day can run past midnight);
/// only the display helpers wrap them modulo 24 hours.
#[pyclass(eq, hash, frozen)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime { minutes: 0 };

    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    /// Build from an hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self::from_minutes(hour * 60 + minute))
        } else {
            None
        }
    }

    #[inline]
    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    /// Hour of the day for display, `floor(minutes / 60)` wrapped into 0-23.
    #[inline]
    pub fn hour(self) -> u32 {
        (self.minutes / 60) % 24
    }

    #[inline]
    pub fn minute(self) -> u32 {
        self.minutes % 60
    }

    /// Advance the clock. Saturates instead of overflowing.
    #[inline]
    pub fn plus_minutes(self, minutes: u32) -> Self {
        Self::from_minutes(self.minutes.saturating_add(minutes))
    }

    /// Minutes from `self` to `later`, zero if `later` is not after `self`.
    pub fn minutes_until(self, later: ClockTime) -> u32 {
        later.minutes.saturating_sub(self.minutes)
    }

    /// Parse the wire form: `HH:MM` or `HH:MM:SS` (seconds are discarded).
    pub fn parse_24h(s: &str) -> Result<Self, TimeParseError> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map(Self::from)
            .map_err(|_| TimeParseError::new(s))
    }

    /// Parse the display form produced by [`ClockTime::format_12h`].
    pub fn parse_12h(s: &str) -> Result<Self, TimeParseError> {
        NaiveTime::parse_from_str(s.trim(), "%I:%M %p")
            .map(Self::from)
            .map_err(|_| TimeParseError::new(s))
    }

    /// Display form `H:MM AM/PM`. Hour 0 shows as 12 AM, hour 12 as 12 PM.
    pub fn format_12h(self) -> String {
        let hour = self.hour();
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let hour12 = match hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        format!("{}:{:02} {}", hour12, self.minute(), suffix)
    }

    /// Wire form `HH:MM`.
    pub fn format_24h(self) -> String {
        format!("{:02}:{:02}", self.hour(), self.minute())
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self::from_minutes(time.hour() * 60 + time.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_12h())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format_24h())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_24h(&raw).map_err(serde::de::Error::custom)
    }
}

#[pymethods]
impl ClockTime {
    #[new]
    #[pyo3(signature = (hour, minute=0))]
    fn py_new(hour: u32, minute: u32) -> PyResult<Self> {
        Self::from_hm(hour, minute).ok_or_else(|| {
            pyo3::exceptions::PyValueError::new_err(format!(
                "Invalid time of day: {}:{:02}",
                hour, minute
            ))
        })
    }

    #[getter(minutes)]
    fn py_minutes(&self) -> u32 {
        self.minutes
    }

    fn __str__(&self) -> String {
        self.format_12h()
    }

    fn __repr__(&self) -> String {
        format!("ClockTime({})", self.format_24h())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> ClockTime {
        ClockTime::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn test_format_12h_boundaries() {
        assert_eq!(t(0, 0).format_12h(), "12:00 AM");
        assert_eq!(t(0, 5).format_12h(), "12:05 AM");
        assert_eq!(t(9, 0).format_12h(), "9:00 AM");
        assert_eq!(t(11, 59).format_12h(), "11:59 AM");
        assert_eq!(t(12, 0).format_12h(), "12:00 PM");
        assert_eq!(t(13, 15).format_12h(), "1:15 PM");
        assert_eq!(t(23, 59).format_12h(), "11:59 PM");
    }

    #[test]
    fn test_format_parse_roundtrip_whole_day() {
        for minutes in 0..MINUTES_PER_DAY {
            let time = ClockTime::from_minutes(minutes);
            let parsed = ClockTime::parse_12h(&time.format_12h()).unwrap();
            assert_eq!(parsed.minutes(), minutes, "roundtrip failed at {}", minutes);
        }
    }

    #[test]
    fn test_past_midnight_wraps_for_display_only() {
        let late = t(23, 30).plus_minutes(45);
        assert_eq!(late.minutes(), 23 * 60 + 75);
        assert_eq!(late.format_12h(), "12:15 AM");
        assert_eq!(late.format_24h(), "00:15");
    }

    #[test]
    fn test_parse_24h_forms() {
        assert_eq!(ClockTime::parse_24h("09:00"), Ok(t(9, 0)));
        assert_eq!(ClockTime::parse_24h(" 9:30 "), Ok(t(9, 30)));
        assert_eq!(ClockTime::parse_24h("14:45:00"), Ok(t(14, 45)));
        assert!(ClockTime::parse_24h("25:00").is_err());
        assert!(ClockTime::parse_24h("").is_err());
        assert_eq!(
            ClockTime::parse_24h("nine").unwrap_err().input(),
            "nine"
        );
    }

    #[test]
    fn test_from_hm_rejects_out_of_range() {
        assert!(ClockTime::from_hm(24, 0).is_none());
        assert!(ClockTime::from_hm(10, 60).is_none());
    }

    #[test]
    fn test_plus_minutes_saturates() {
        let max = ClockTime::from_minutes(u32::MAX);
        assert_eq!(max.plus_minutes(10).minutes(), u32::MAX);
    }

    #[test]
    fn test_minutes_until() {
        assert_eq!(t(9, 0).minutes_until(t(10, 15)), 75);
        assert_eq!(t(10, 15).minutes_until(t(9, 0)), 0);
    }

    #[test]
    fn test_serde_uses_wire_form() {
        let json = serde_json::to_string(&t(8, 5)).unwrap();
        assert_eq!(json, "\"08:05\"");
        let back: ClockTime = serde_json::from_str("\"08:05:00\"").unwrap();
        assert_eq!(back, t(8, 5));
        assert!(serde_json::from_str::<ClockTime>("\"8 o'clock\"").is_err());
    }
}

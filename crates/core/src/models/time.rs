//! Weekday and time-of-day primitives.
//!
//! All scheduling arithmetic happens on whole minutes since midnight so that
//! `"9:00"`, `"09:00:00"` and a `NaiveTime` of nine o'clock compare equal.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{TimeError, TimeResult};

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Teaching days of the week. Serialized as the lowercase short name; any
/// spelling `FromStr` accepts is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(Weekday::Mon),
            "tue" | "tuesday" => Ok(Weekday::Tue),
            "wed" | "wednesday" => Ok(Weekday::Wed),
            "thu" | "thursday" => Ok(Weekday::Thu),
            "fri" | "friday" => Ok(Weekday::Fri),
            other => Err(TimeError::Validation(format!(
                "Unknown teaching day: {}",
                other
            ))),
        }
    }
}

impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Builds a time from hours and minutes, rejecting anything past 24:00.
    pub fn from_hm(hour: u16, minute: u16) -> TimeResult<Self> {
        if hour > 24 || minute >= 60 {
            return Err(TimeError::Validation(format!(
                "Time out of range: {:02}:{:02}",
                hour, minute
            )));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn from_minutes(minutes: u16) -> TimeResult<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(TimeError::Validation(format!(
                "Time out of range: {} minutes since midnight",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    /// Callers guarantee `minutes` does not exceed a day.
    pub(crate) const fn minutes_unchecked(minutes: u16) -> Self {
        Self(minutes)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl From<NaiveTime> for ClockTime {
    // Seconds are truncated; the scheduling grid has no sub-minute windows.
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeError::Validation(format!("Invalid time of day: {:?}", s));

        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        if let Some(second) = parts.next() {
            if second.parse::<u16>().map_err(|_| invalid())? != 0 {
                return Err(invalid());
            }
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A half-open `[start, end)` window on one teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    pub day: Weekday,
    pub start: ClockTime,
    pub end: ClockTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    day: Weekday,
    start: ClockTime,
    end: ClockTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = TimeError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.day, raw.start, raw.end)
    }
}

impl TimeWindow {
    pub fn new(day: Weekday, start: ClockTime, end: ClockTime) -> TimeResult<Self> {
        if start >= end {
            return Err(TimeError::Validation(format!(
                "Window must end after it starts: {} {}-{}",
                day, start, end
            )));
        }
        Ok(Self { day, start, end })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// Same day and the intervals intersect; touching endpoints do not.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.day == other.day && !(self.end <= other.start || other.end <= self.start)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start, self.end)
    }
}

/// Lengths a teaching slot may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotDuration {
    TwoHours,
    ThreeHours,
}

impl SlotDuration {
    pub fn hours(&self) -> u16 {
        match self {
            SlotDuration::TwoHours => 2,
            SlotDuration::ThreeHours => 3,
        }
    }

    pub fn minutes(&self) -> u16 {
        self.hours() * 60
    }

    pub fn from_minutes(minutes: u16) -> TimeResult<Self> {
        match minutes {
            120 => Ok(SlotDuration::TwoHours),
            180 => Ok(SlotDuration::ThreeHours),
            other => Err(TimeError::Validation(format!(
                "Slot duration must be 2 or 3 hours, got {} minutes",
                other
            ))),
        }
    }
}

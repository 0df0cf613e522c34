use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowParseError {
    #[error("window {0:?} is not of the form HH:mm-HH:mm")]
    Shape(String),

    #[error("invalid time of day {0:?}")]
    Time(String),
}

/// A time-of-day interval, inclusive at both ends.
///
/// - `start < end`: plain interval.
/// - `start > end`: wraps past midnight (e.g. 23:55-00:10).
/// - `start == end`: the full 24h day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build from hour/minute pairs. Returns `None` for out-of-range values.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
            end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
        })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn is_full_day(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.is_full_day() {
            return true;
        }
        if self.start < self.end {
            t >= self.start && t <= self.end
        } else {
            t >= self.start || t <= self.end
        }
    }

    /// Parse `"HH:mm-HH:mm"` (seconds optional on either side).
    pub fn parse(text: &str) -> Result<Self, WindowParseError> {
        let mut parts = text.trim().split('-');
        let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(WindowParseError::Shape(text.to_string()));
        };
        Ok(Self {
            start: parse_time(start)?,
            end: parse_time(end)?,
        })
    }
}

fn parse_time(text: &str) -> Result<NaiveTime, WindowParseError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|_| WindowParseError::Time(text.to_string()))
}

impl FromStr for TimeWindow {
    type Err = WindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `HH:MM`, with `:SS` appended when the seconds are non-zero.
struct TimeOfDay(NaiveTime);

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())?;
        if self.0.second() != 0 {
            write!(f, ":{:02}", self.0.second())?;
        }
        Ok(())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", TimeOfDay(self.start), TimeOfDay(self.end))
    }
}

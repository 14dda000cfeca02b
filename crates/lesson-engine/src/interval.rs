//! Half-open time-of-day ranges.
//!
//! An [`Interval`] is `[from, to)` on a wall clock with no date and no timezone.
//! Two intervals overlap when `a.from < b.to && b.from < a.to`, so intervals that
//! merely touch (one ends exactly when the other starts) are NOT conflicts.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// A non-empty `[from, to)` time-of-day range within a single day.
///
/// Ordered by start, then end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IntervalDto", into = "IntervalDto")]
pub struct Interval {
    from: NaiveTime,
    to: NaiveTime,
}

impl Interval {
    /// Create an interval, rejecting empty and inverted ranges.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidRange` when `to <= from`.
    pub fn new(from: NaiveTime, to: NaiveTime) -> Result<Self> {
        if to <= from {
            return Err(ScheduleError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Create an interval from hour/minute pairs.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTime` for clock values out of range and
    /// `ScheduleError::InvalidRange` when the end is not after the start.
    pub fn from_hm(from_hour: u32, from_min: u32, to_hour: u32, to_min: u32) -> Result<Self> {
        Self::new(hm(from_hour, from_min)?, hm(to_hour, to_min)?)
    }

    /// Parse `"HH:MM-HH:MM"`.
    pub fn parse(s: &str) -> Result<Self> {
        let (from, to) = s.split_once('-').ok_or_else(|| {
            ScheduleError::InvalidTime(format!("expected HH:MM-HH:MM, got '{}'", s))
        })?;
        Self::new(parse_time(from.trim())?, parse_time(to.trim())?)
    }

    /// Inclusive start.
    pub fn start(&self) -> NaiveTime {
        self.from
    }

    /// Exclusive end.
    pub fn end(&self) -> NaiveTime {
        self.to
    }

    /// Strict half-open overlap. Symmetric.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// Minutes shared by both intervals, 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &Interval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.from.max(other.from);
        let end = self.to.min(other.to);
        end.signed_duration_since(start).num_minutes()
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// Half-open membership: `from` is inside, `to` is not.
    pub fn contains_time(&self, t: NaiveTime) -> bool {
        self.from <= t && t < self.to
    }

    pub fn duration_minutes(&self) -> i64 {
        self.to.signed_duration_since(self.from).num_minutes()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_time(self.from), format_time(self.to))
    }
}

/// Parse a wall-clock time as `HH:MM`, falling back to `HH:MM:SS`.
///
/// # Errors
/// Returns `ScheduleError::InvalidTime` when neither format matches.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| ScheduleError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Format as `HH:MM`, appending seconds only when they are non-zero.
pub fn format_time(t: NaiveTime) -> String {
    if t.second() == 0 {
        t.format("%H:%M").to_string()
    } else {
        t.format("%H:%M:%S").to_string()
    }
}

fn hm(hour: u32, min: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(hour, min, 0)
        .ok_or_else(|| ScheduleError::InvalidTime(format!("{:02}:{:02}", hour, min)))
}

/// Wire form: `{"from": "09:00", "to": "10:00"}`.
#[derive(Serialize, Deserialize)]
struct IntervalDto {
    from: String,
    to: String,
}

impl TryFrom<IntervalDto> for Interval {
    type Error = ScheduleError;

    fn try_from(dto: IntervalDto) -> Result<Self> {
        Interval::new(parse_time(&dto.from)?, parse_time(&dto.to)?)
    }
}

impl From<Interval> for IntervalDto {
    fn from(i: Interval) -> Self {
        Self {
            from: format_time(i.from),
            to: format_time(i.to),
        }
    }
}

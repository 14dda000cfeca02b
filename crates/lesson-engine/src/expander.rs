//! Weekly pattern expansion -- converts recurring slots into concrete dated occurrences.
//!
//! Expansion walks every calendar date in an inclusive horizon and emits one
//! [`Occurrence`] per pattern entry whose weekday matches. All times are naive
//! wall-clock values; no timezone conversion takes place.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::interval::{format_time, parse_time, Interval};
use crate::pattern::{Slot, WeeklyPattern};

/// Lifecycle of a single dated occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    #[default]
    Scheduled,
    /// Overlaps an existing booking on the same date.
    Conflicted,
    /// Terminal. Cancelled occurrences never take part in conflict detection.
    Cancelled,
}

/// A single dated instance of a weekly slot.
///
/// Date and interval are fixed at construction; only the status may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OccurrenceDto", into = "OccurrenceDto")]
pub struct Occurrence {
    date: NaiveDate,
    interval: Interval,
    status: OccurrenceStatus,
}

impl Occurrence {
    /// A new `Scheduled` occurrence.
    pub fn new(date: NaiveDate, interval: Interval) -> Self {
        Self {
            date,
            interval,
            status: OccurrenceStatus::Scheduled,
        }
    }

    pub fn with_status(date: NaiveDate, interval: Interval, status: OccurrenceStatus) -> Self {
        Self {
            date,
            interval,
            status,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn status(&self) -> OccurrenceStatus {
        self.status
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.interval.start())
    }

    pub fn end(&self) -> NaiveDateTime {
        self.date.and_time(self.interval.end())
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OccurrenceStatus::Cancelled
    }

    /// Same calendar date and overlapping intervals.
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.date == other.date && self.interval.overlaps(&other.interval)
    }

    /// Move to a new status.
    ///
    /// Allowed: `Scheduled -> Conflicted`, `Scheduled -> Cancelled`,
    /// `Conflicted -> Cancelled`. Setting the current status again is a no-op.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidTransition` for any other move.
    pub fn transition(&mut self, to: OccurrenceStatus) -> Result<()> {
        use OccurrenceStatus::*;

        match (self.status, to) {
            (from, to) if from == to => Ok(()),
            (Scheduled, Conflicted) | (Scheduled, Cancelled) | (Conflicted, Cancelled) => {
                self.status = to;
                Ok(())
            }
            (from, to) => Err(ScheduleError::InvalidTransition { from, to }),
        }
    }

    pub fn mark_conflicted(&mut self) -> Result<()> {
        self.transition(OccurrenceStatus::Conflicted)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(OccurrenceStatus::Cancelled)
    }
}

/// Wire form: `{"date": "2026-03-04", "from": "14:00", "to": "15:00", "status": "scheduled"}`.
#[derive(Serialize, Deserialize)]
struct OccurrenceDto {
    date: NaiveDate,
    from: String,
    to: String,
    #[serde(default)]
    status: OccurrenceStatus,
}

impl TryFrom<OccurrenceDto> for Occurrence {
    type Error = ScheduleError;

    fn try_from(dto: OccurrenceDto) -> Result<Self> {
        let interval = Interval::new(parse_time(&dto.from)?, parse_time(&dto.to)?)?;
        Ok(Occurrence::with_status(dto.date, interval, dto.status))
    }
}

impl From<Occurrence> for OccurrenceDto {
    fn from(o: Occurrence) -> Self {
        Self {
            date: o.date,
            from: format_time(o.interval.start()),
            to: format_time(o.interval.end()),
            status: o.status,
        }
    }
}

/// An inclusive `[start, end]` range of calendar dates.
///
/// A horizon with `start > end` is empty; it is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `weeks` full weeks beginning on `start`, cut short at `NaiveDate::MAX`.
    ///
    /// Zero weeks gives an empty horizon.
    pub fn weeks_from(start: NaiveDate, weeks: u32) -> Self {
        let days = u64::from(weeks) * 7;
        if days == 0 {
            return match start.pred_opt() {
                Some(end) => Self { start, end },
                None => Self::empty(),
            };
        }
        let end = start
            .checked_add_days(Days::new(days - 1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// A horizon containing no dates.
    pub fn empty() -> Self {
        Self {
            start: NaiveDate::MAX,
            end: NaiveDate::MIN,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the horizon, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn num_days(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }
}

/// Expand a weekly pattern into dated occurrences between `start` and `end` inclusive.
///
/// Dates are visited in ascending order; occurrences on the same date follow the
/// pattern's start-time order. Returns an empty list when `start > end` or the
/// pattern has no entries.
///
/// No cap is placed on the horizon length. Callers are expected to pass a
/// realistic window (a few months).
pub fn expand(pattern: &WeeklyPattern, start: NaiveDate, end: NaiveDate) -> Vec<Occurrence> {
    expand_within(pattern, &Horizon::new(start, end))
}

/// Expand a weekly pattern over a [`Horizon`].
pub fn expand_within(pattern: &WeeklyPattern, horizon: &Horizon) -> Vec<Occurrence> {
    if pattern.is_empty() || horizon.is_empty() {
        return Vec::new();
    }

    let occurrences: Vec<Occurrence> = horizon
        .days()
        .flat_map(|date| {
            pattern
                .slots_on(date.weekday())
                .map(move |slot| Occurrence::new(date, slot.interval))
        })
        .collect();

    debug!(
        slots = pattern.len(),
        days = horizon.num_days(),
        occurrences = occurrences.len(),
        "expanded weekly pattern"
    );
    occurrences
}

/// Expand a single slot over a [`Horizon`].
pub fn expand_slot(slot: &Slot, horizon: &Horizon) -> Vec<Occurrence> {
    horizon
        .days()
        .filter(|date| date.weekday() == slot.weekday)
        .map(|date| Occurrence::new(date, slot.interval))
        .collect()
}

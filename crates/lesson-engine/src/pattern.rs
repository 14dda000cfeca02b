//! Weekly recurring commitments.
//!
//! A [`WeeklyPattern`] is an ordered set of [`Slot`]s, each a `(weekday, interval)`
//! pair. It describes either a tutor's declared availability or a student's
//! proposed lesson schedule. Slots on the same weekday never overlap each other.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::interval::{format_time, parse_time, Interval};
use crate::weekday;

/// One weekly recurring entry.
///
/// Serialized as `{"weekday": 3, "from": "14:00", "to": "15:00"}` with
/// `weekday` counted from Sunday = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "SlotDto", into = "SlotDto")]
pub struct Slot {
    pub weekday: Weekday,
    pub interval: Interval,
}

impl Slot {
    pub fn new(weekday: Weekday, interval: Interval) -> Self {
        Self { weekday, interval }
    }

    /// Build a slot from raw wire values.
    ///
    /// # Errors
    /// Returns `InvalidWeekday`, `InvalidTime` or `InvalidRange`.
    pub fn from_parts(weekday_index: u8, from: &str, to: &str) -> Result<Self> {
        Ok(Self {
            weekday: weekday::from_index(weekday_index)?,
            interval: Interval::new(parse_time(from)?, parse_time(to)?)?,
        })
    }

    /// Same weekday and overlapping intervals.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.weekday == other.weekday && self.interval.overlaps(&other.interval)
    }

    pub fn start(&self) -> NaiveTime {
        self.interval.start()
    }

    pub fn end(&self) -> NaiveTime {
        self.interval.end()
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        weekday::index(self.weekday)
            .cmp(&weekday::index(other.weekday))
            .then_with(|| self.interval.cmp(&other.interval))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekday, self.interval)
    }
}

#[derive(Serialize, Deserialize)]
struct SlotDto {
    weekday: u8,
    from: String,
    to: String,
}

impl TryFrom<SlotDto> for Slot {
    type Error = ScheduleError;

    fn try_from(dto: SlotDto) -> Result<Self> {
        Slot::from_parts(dto.weekday, &dto.from, &dto.to)
    }
}

impl From<Slot> for SlotDto {
    fn from(slot: Slot) -> Self {
        Self {
            weekday: weekday::index(slot.weekday),
            from: format_time(slot.start()),
            to: format_time(slot.end()),
        }
    }
}

/// An ordered set of weekly slots with no same-day overlaps.
///
/// Entries are kept sorted by weekday (Sunday first) and then by start time, so
/// iteration order never depends on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Slot>", into = "Vec<Slot>")]
pub struct WeeklyPattern {
    slots: Vec<Slot>,
}

impl WeeklyPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern from slots in any order.
    ///
    /// # Errors
    /// Returns `ScheduleError::SameDayOverlap` for the first slot that collides
    /// with one already accepted.
    pub fn from_slots<I>(slots: I) -> Result<Self>
    where
        I: IntoIterator<Item = Slot>,
    {
        let mut pattern = Self::new();
        for slot in slots {
            pattern.add_slot(slot.weekday, slot.interval)?;
        }
        Ok(pattern)
    }

    /// Insert a slot, keeping entries sorted.
    ///
    /// # Errors
    /// Returns `ScheduleError::SameDayOverlap` when `interval` overlaps an existing
    /// entry on `weekday`. The pattern is unchanged on error.
    pub fn add_slot(&mut self, weekday: Weekday, interval: Interval) -> Result<()> {
        let slot = Slot::new(weekday, interval);
        if let Some(existing) = self.find_overlap(&slot) {
            return Err(ScheduleError::SameDayOverlap {
                weekday,
                interval,
                existing: existing.interval,
            });
        }
        let pos = self.slots.partition_point(|s| *s < slot);
        self.slots.insert(pos, slot);
        Ok(())
    }

    /// Remove the entry exactly matching `(weekday, interval)`.
    ///
    /// # Errors
    /// Returns `ScheduleError::NotFound` when no such entry exists.
    pub fn remove_slot(&mut self, weekday: Weekday, interval: Interval) -> Result<()> {
        let slot = Slot::new(weekday, interval);
        match self.slots.binary_search(&slot) {
            Ok(pos) => {
                self.slots.remove(pos);
                Ok(())
            }
            Err(_) => Err(ScheduleError::NotFound { weekday, interval }),
        }
    }

    /// The first entry that overlaps `slot` on the same weekday, if any.
    pub fn find_overlap(&self, slot: &Slot) -> Option<&Slot> {
        self.slots_on(slot.weekday).find(|s| s.interval.overlaps(&slot.interval))
    }

    /// All entries ordered by weekday, then start time.
    pub fn entries(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter()
    }

    /// Entries on one weekday, ordered by start time.
    pub fn slots_on(&self, weekday: Weekday) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter().filter(move |s| s.weekday == weekday)
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.slots.binary_search(slot).is_ok()
    }

    pub fn as_slice(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total weekly minutes committed by this pattern.
    pub fn weekly_minutes(&self) -> i64 {
        self.slots.iter().map(|s| s.interval.duration_minutes()).sum()
    }
}

impl TryFrom<Vec<Slot>> for WeeklyPattern {
    type Error = ScheduleError;

    fn try_from(slots: Vec<Slot>) -> Result<Self> {
        Self::from_slots(slots)
    }
}

impl From<WeeklyPattern> for Vec<Slot> {
    fn from(pattern: WeeklyPattern) -> Self {
        pattern.slots
    }
}

//! Tutor availability: coverage checks and free windows.
//!
//! A tutor declares a weekly availability pattern. Booked weekly slots (from any
//! number of students) are subtracted from it to find the windows a new lesson
//! could still take. Everything here works per weekday on time-of-day intervals;
//! dated bookings are handled by [`conflict`](crate::conflict).

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::pattern::{Slot, WeeklyPattern};
use crate::weekday::WEEK;

/// A free time-of-day window on one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub slot: Slot,
    pub duration_minutes: i64,
}

/// Whether some availability entry on the slot's weekday fully contains it.
pub fn covers(availability: &WeeklyPattern, slot: &Slot) -> bool {
    availability
        .slots_on(slot.weekday)
        .any(|a| a.interval.contains(&slot.interval))
}

/// Merge overlapping or adjacent booked intervals on `weekday`.
///
/// Returns a sorted, non-overlapping list of (start, end) pairs.
fn merge_booked(booked: &[Slot], weekday: Weekday) -> Vec<(NaiveTime, NaiveTime)> {
    let mut intervals: Vec<(NaiveTime, NaiveTime)> = booked
        .iter()
        .filter(|s| s.weekday == weekday)
        .map(|s| (s.start(), s.end()))
        .collect();

    intervals.sort();

    let mut merged: Vec<(NaiveTime, NaiveTime)> = Vec::new();
    for (start, end) in intervals {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Free windows on one weekday: availability minus booked slots.
///
/// Booked slots may overlap each other; they are merged first. Windows shorter
/// than `min_duration_minutes` are dropped. Returned sorted by start time.
pub fn free_windows(
    availability: &WeeklyPattern,
    booked: &[Slot],
    weekday: Weekday,
    min_duration_minutes: i64,
) -> Vec<FreeWindow> {
    let busy = merge_booked(booked, weekday);
    let mut windows = Vec::new();

    for available in availability.slots_on(weekday) {
        let mut cursor = available.start();
        let window_end = available.end();

        for &(busy_start, busy_end) in &busy {
            if busy_end <= cursor || busy_start >= window_end {
                continue;
            }
            if cursor < busy_start {
                push_window(&mut windows, weekday, cursor, busy_start, min_duration_minutes);
            }
            cursor = cursor.max(busy_end);
        }

        if cursor < window_end {
            push_window(&mut windows, weekday, cursor, window_end, min_duration_minutes);
        }
    }

    windows
}

/// Free windows for every weekday, Sunday first.
pub fn weekly_free_windows(
    availability: &WeeklyPattern,
    booked: &[Slot],
    min_duration_minutes: i64,
) -> Vec<FreeWindow> {
    WEEK.iter()
        .flat_map(|&day| free_windows(availability, booked, day, min_duration_minutes))
        .collect()
}

fn push_window(
    windows: &mut Vec<FreeWindow>,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    min_duration_minutes: i64,
) {
    // start < end is guaranteed by the callers.
    let Ok(interval) = Interval::new(start, end) else {
        return;
    };
    let duration_minutes = interval.duration_minutes();
    if duration_minutes >= min_duration_minutes {
        windows.push(FreeWindow {
            slot: Slot::new(weekday, interval),
            duration_minutes,
        });
    }
}

//! Integer weekday mapping used on every external boundary.
//!
//! Weekdays cross the wire as `0..=6` with `0 = Sunday`, matching the common
//! JavaScript `Date.getDay()` convention. Internally they are `chrono::Weekday`.

use chrono::Weekday;

use crate::error::{Result, ScheduleError};

/// All seven weekdays in index order (Sunday first).
pub const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Convert a 0-based, Sunday-first index into a `Weekday`.
///
/// # Errors
/// Returns `ScheduleError::InvalidWeekday` for indices above 6.
pub fn from_index(index: u8) -> Result<Weekday> {
    WEEK.get(index as usize)
        .copied()
        .ok_or(ScheduleError::InvalidWeekday(index))
}

/// The Sunday-first index of a weekday (`Sun = 0`, `Sat = 6`).
pub fn index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

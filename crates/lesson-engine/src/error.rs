//! Error types for lesson-engine operations.
//!
//! Every variant is a caller-correctable validation outcome. None of them leave
//! a [`ScheduleBuilder`](crate::builder::ScheduleBuilder) in a modified state.
//! Overlap against external commitments is never an error; it is reported
//! through the conflict ledger instead.

use chrono::{NaiveTime, Weekday};
use thiserror::Error;

use crate::expander::OccurrenceStatus;
use crate::interval::Interval;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// `to` is not strictly after `from`.
    #[error("Invalid range: end {to} must be after start {from}")]
    InvalidRange { from: NaiveTime, to: NaiveTime },

    /// The slot overlaps another slot already in the same schedule on that weekday.
    #[error("Slot {weekday} {interval} overlaps existing slot {existing} on the same day")]
    SameDayOverlap {
        weekday: Weekday,
        interval: Interval,
        existing: Interval,
    },

    #[error("Slot not found: {weekday} {interval}")]
    NotFound { weekday: Weekday, interval: Interval },

    #[error("Cannot finalize an empty schedule")]
    EmptySchedule,

    /// The slot is shorter than the policy minimum.
    #[error("Slot of {actual} minutes is shorter than the {minimum}-minute minimum")]
    TooShort { actual: i64, minimum: i64 },

    #[error("Slot index {index} out of range for schedule of {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Slot index {0} listed more than once")]
    DuplicateIndex(usize),

    /// Weekday indices run 0 (Sunday) through 6 (Saturday).
    #[error("Invalid weekday index: {0} (expected 0-6, 0 = Sunday)")]
    InvalidWeekday(u8),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid occurrence transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: OccurrenceStatus,
        to: OccurrenceStatus,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ScheduleError {
    fn from(e: serde_json::Error) -> Self {
        ScheduleError::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

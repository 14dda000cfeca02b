//! Caller-side booking policy.

use serde::{Deserialize, Serialize};

/// Default shortest lesson a builder will accept, in minutes.
pub const DEFAULT_MIN_DURATION_MINUTES: i64 = 30;

/// Rules a [`ScheduleBuilder`](crate::builder::ScheduleBuilder) applies on top of
/// the structural [`Interval`](crate::interval::Interval) invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    /// Slots shorter than this are rejected with `TooShort`. Zero disables the check.
    pub min_duration_minutes: i64,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            min_duration_minutes: DEFAULT_MIN_DURATION_MINUTES,
        }
    }
}

impl SchedulePolicy {
    pub fn with_min_duration(mut self, minutes: i64) -> Self {
        self.min_duration_minutes = minutes;
        self
    }
}

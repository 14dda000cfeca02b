//! # lesson-engine
//!
//! Weekly lesson pattern expansion and conflict detection for tutoring schedules.
//!
//! The engine reconciles three inputs: a tutor's recurring weekly availability,
//! a student's requested weekly lesson pattern, and the concrete lessons already
//! booked. It is computation only: no I/O, no timezones, no global state. All
//! times are naive wall-clock values.
//!
//! ## Modules
//!
//! - [`interval`]: half-open `[from, to)` time-of-day ranges
//! - [`pattern`]: `(weekday, interval)` slots and the weekly pattern set
//! - [`expander`]: weekly pattern → dated occurrences over a horizon
//! - [`conflict`]: recurring and dated conflict detection
//! - [`builder`]: per-session schedule builder with a conflict ledger
//! - [`availability`]: tutor availability coverage and free windows
//! - [`policy`]: caller-side booking policy
//! - [`weekday`]: Sunday-first integer weekday mapping
//! - [`error`]: Error types

pub mod availability;
pub mod builder;
pub mod conflict;
pub mod error;
pub mod expander;
pub mod interval;
pub mod pattern;
pub mod policy;
pub mod weekday;

pub use builder::{ConflictLedger, FinalizedSchedule, LedgerEntry, ScheduleBuilder, SlotStatus};
pub use conflict::{
    detect_occurrence_conflicts, detect_pattern_conflicts, find_conflicts, Commitments,
    ConflictDetector, ConflictMatch, MatchedAgainst, OverlapKind,
};
pub use error::ScheduleError;
pub use expander::{expand, expand_slot, expand_within, Horizon, Occurrence, OccurrenceStatus};
pub use interval::Interval;
pub use pattern::{Slot, WeeklyPattern};
pub use policy::SchedulePolicy;

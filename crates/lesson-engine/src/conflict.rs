//! Detect overlaps between proposed weekly slots and existing commitments.
//!
//! Two detection modes exist, and every match records which one produced it:
//!
//! - **Recurring pattern**: a candidate slot against existing weekly slots on the
//!   same weekday. A match means "this clashes every week".
//! - **Dated occurrence**: the candidate is expanded over a horizon, then each
//!   candidate occurrence is compared against existing occurrences on the same
//!   calendar date. A match means "this clashes on this specific date".
//!
//! Adjacent intervals (one ends exactly when the other starts) are NOT conflicts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::expander::{expand_slot, Horizon, Occurrence};
use crate::pattern::{Slot, WeeklyPattern};

/// Which detection mode produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    /// Same weekday, overlapping time of day. Recurs every week.
    RecurringPattern,
    /// Same calendar date, overlapping time of day. This date only.
    DatedOccurrence,
}

/// The existing commitment a candidate collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchedAgainst {
    /// An existing weekly slot.
    Slot { slot: Slot },
    /// An existing dated occurrence, hit by the candidate's occurrence on `date`.
    Occurrence { date: NaiveDate, existing: Occurrence },
}

/// A single overlap between a candidate slot and an existing commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictMatch {
    pub matched_against: MatchedAgainst,
    pub overlap_kind: OverlapKind,
    pub overlap_minutes: i64,
}

impl ConflictMatch {
    fn recurring(candidate: &Slot, existing: &Slot) -> Self {
        Self {
            matched_against: MatchedAgainst::Slot { slot: *existing },
            overlap_kind: OverlapKind::RecurringPattern,
            overlap_minutes: candidate.interval.overlap_minutes(&existing.interval),
        }
    }

    fn dated(candidate: &Occurrence, existing: &Occurrence) -> Self {
        Self {
            matched_against: MatchedAgainst::Occurrence {
                date: candidate.date(),
                existing: *existing,
            },
            overlap_kind: OverlapKind::DatedOccurrence,
            overlap_minutes: candidate.interval().overlap_minutes(&existing.interval()),
        }
    }

    /// The calendar date of a dated match, `None` for recurring matches.
    pub fn date(&self) -> Option<NaiveDate> {
        match &self.matched_against {
            MatchedAgainst::Slot { .. } => None,
            MatchedAgainst::Occurrence { date, .. } => Some(*date),
        }
    }
}

/// A detected overlap between two dated occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceConflict {
    pub occurrence_a: Occurrence,
    pub occurrence_b: Occurrence,
    pub overlap_minutes: i64,
}

/// Find all pairwise conflicts between two occurrence lists.
///
/// Two occurrences conflict when they fall on the same calendar date and their
/// intervals overlap. Cancelled occurrences on either side are ignored.
/// Results follow the order of `occurrences_a`, then of `occurrences_b`.
pub fn find_conflicts(
    occurrences_a: &[Occurrence],
    occurrences_b: &[Occurrence],
) -> Vec<OccurrenceConflict> {
    let by_date = index_by_date(occurrences_b);
    let mut conflicts = Vec::new();

    for a in occurrences_a.iter().filter(|o| !o.is_cancelled()) {
        let Some(same_day) = by_date.get(&a.date()) else {
            continue;
        };
        for b in same_day {
            if a.interval().overlaps(&b.interval()) {
                conflicts.push(OccurrenceConflict {
                    occurrence_a: *a,
                    occurrence_b: *b,
                    overlap_minutes: a.interval().overlap_minutes(&b.interval()),
                });
            }
        }
    }

    conflicts
}

/// Pattern-vs-pattern detection.
///
/// Returns every existing slot on the candidate's weekday whose interval
/// overlaps the candidate, in the order given. Conflicts are additive: all
/// matches are returned, not just the first.
pub fn detect_pattern_conflicts(candidate: &Slot, existing: &[Slot]) -> Vec<ConflictMatch> {
    existing
        .iter()
        .filter(|slot| candidate.overlaps(slot))
        .map(|slot| ConflictMatch::recurring(candidate, slot))
        .collect()
}

/// Pattern-vs-dated-occurrence detection.
///
/// Expands `candidate` over `horizon`, then compares each candidate occurrence
/// against every non-cancelled existing occurrence on the same date. Results are
/// ordered by date, then by the order of `existing`.
pub fn detect_occurrence_conflicts(
    candidate: &Slot,
    existing: &[Occurrence],
    horizon: &Horizon,
) -> Vec<ConflictMatch> {
    let by_date = index_by_date(existing);
    dated_matches(candidate, &by_date, horizon)
}

/// Read-only snapshot of what is already booked.
///
/// Typically fetched once from storage before an interactive session. The engine
/// never refreshes it; callers re-validate against a fresh snapshot before
/// persisting.
///
/// Supply each booking in one form only. A weekly slot listed again as its
/// expanded occurrences is reported once as a recurring match and once more per
/// date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Commitments {
    /// Existing weekly slots. May overlap one another (they can come from
    /// different students' patterns).
    #[serde(default)]
    pub weekly: Vec<Slot>,
    /// Existing dated bookings, including one-off sessions.
    #[serde(default)]
    pub occurrences: Vec<Occurrence>,
}

impl Commitments {
    pub fn new(weekly: Vec<Slot>, occurrences: Vec<Occurrence>) -> Self {
        Self {
            weekly,
            occurrences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty() && self.occurrences.is_empty()
    }
}

/// Runs both detection modes against one commitments snapshot.
///
/// Existing occurrences are indexed by date once at construction, so each
/// `detect` call costs `candidate occurrences x existing occurrences on that date`.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    weekly: Vec<Slot>,
    occurrences: BTreeMap<NaiveDate, Vec<Occurrence>>,
    horizon: Horizon,
}

impl ConflictDetector {
    pub fn new(commitments: Commitments, horizon: Horizon) -> Self {
        Self {
            occurrences: index_by_date(&commitments.occurrences),
            weekly: commitments.weekly,
            horizon,
        }
    }

    /// A detector with nothing booked. Every candidate is clean.
    pub fn empty(horizon: Horizon) -> Self {
        Self::new(Commitments::default(), horizon)
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn weekly(&self) -> &[Slot] {
        &self.weekly
    }

    /// Detect every conflict for one candidate slot.
    ///
    /// Recurring matches come first, then dated matches. An empty `Vec` means
    /// the candidate is clean.
    #[instrument(level = "debug", skip(self, candidate), fields(candidate = %candidate))]
    pub fn detect(&self, candidate: &Slot) -> Vec<ConflictMatch> {
        let mut matches = detect_pattern_conflicts(candidate, &self.weekly);
        let recurring = matches.len();

        matches.extend(dated_matches(candidate, &self.occurrences, &self.horizon));

        debug!(recurring, dated = matches.len() - recurring, "detected conflicts");
        matches
    }

    /// Detect conflicts for every entry of a pattern, in pattern order.
    pub fn detect_pattern(&self, pattern: &WeeklyPattern) -> Vec<(Slot, Vec<ConflictMatch>)> {
        pattern
            .entries()
            .map(|slot| (*slot, self.detect(slot)))
            .collect()
    }

    /// Whether a dated occurrence collides with anything in the snapshot: a
    /// weekly slot on its weekday or an existing occurrence on its date.
    pub fn occurrence_conflicts(&self, occurrence: &Occurrence) -> bool {
        let weekday = occurrence.weekday();
        let interval = occurrence.interval();
        self.weekly
            .iter()
            .any(|slot| slot.weekday == weekday && slot.interval.overlaps(&interval))
            || self
                .occurrences
                .get(&occurrence.date())
                .is_some_and(|same_day| same_day.iter().any(|e| occurrence.overlaps(e)))
    }
}

/// Group non-cancelled occurrences by calendar date, preserving input order per date.
fn index_by_date(occurrences: &[Occurrence]) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences.iter().filter(|o| !o.is_cancelled()) {
        by_date.entry(occurrence.date()).or_default().push(*occurrence);
    }
    by_date
}

fn dated_matches(
    candidate: &Slot,
    by_date: &BTreeMap<NaiveDate, Vec<Occurrence>>,
    horizon: &Horizon,
) -> Vec<ConflictMatch> {
    if by_date.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for occurrence in expand_slot(candidate, horizon) {
        let Some(same_day) = by_date.get(&occurrence.date()) else {
            continue;
        };
        matches.extend(
            same_day
                .iter()
                .filter(|existing| occurrence.interval().overlaps(&existing.interval()))
                .map(|existing| ConflictMatch::dated(&occurrence, existing)),
        );
    }
    matches
}

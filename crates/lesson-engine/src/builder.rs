//! Interactive assembly of a student's weekly lesson schedule.
//!
//! A [`ScheduleBuilder`] is owned by exactly one booking session. Each added
//! slot passes through `Proposed -> {Clean, Conflicting}`:
//!
//! 1. the interval must be valid (`InvalidRange`) and long enough (`TooShort`),
//! 2. it must not overlap another slot of the same schedule (`SameDayOverlap`),
//! 3. it is checked against the commitments snapshot and recorded in the
//!    [`ConflictLedger`] as clean or conflicting.
//!
//! Conflicting slots are kept and flagged, never rejected: a coordinator may
//! still choose to keep a flagged slot pending review. A failed `add_slot`
//! leaves the builder exactly as it was.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::availability::covers;
use crate::conflict::{ConflictDetector, ConflictMatch};
use crate::error::{Result, ScheduleError};
use crate::expander::{expand_within, Occurrence};
use crate::interval::Interval;
use crate::pattern::{Slot, WeeklyPattern};
use crate::policy::SchedulePolicy;

/// Classification of a slot after detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Clean,
    Conflicting,
}

/// Detection result for one proposed slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    slot: Slot,
    status: SlotStatus,
    matches: Vec<ConflictMatch>,
    outside_availability: bool,
}

impl LedgerEntry {
    fn new(slot: Slot, matches: Vec<ConflictMatch>, outside_availability: bool) -> Self {
        let status = if matches.is_empty() {
            SlotStatus::Clean
        } else {
            SlotStatus::Conflicting
        };
        Self {
            slot,
            status,
            matches,
            outside_availability,
        }
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn is_conflicting(&self) -> bool {
        self.status == SlotStatus::Conflicting
    }

    /// Every commitment this slot overlaps. Empty when clean.
    pub fn matches(&self) -> &[ConflictMatch] {
        &self.matches
    }

    /// The slot is not inside the tutor's declared availability. Always `false`
    /// when the builder has no availability configured.
    pub fn outside_availability(&self) -> bool {
        self.outside_availability
    }
}

/// Per-slot conflict status, in the order slots were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConflictLedger {
    entries: Vec<LedgerEntry>,
}

impl ConflictLedger {
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&LedgerEntry> {
        self.entries.get(index)
    }

    pub fn conflicting(&self) -> impl Iterator<Item = &LedgerEntry> + '_ {
        self.entries.iter().filter(|e| e.is_conflicting())
    }

    /// No entry has any match.
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| !e.is_conflicting())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of [`ScheduleBuilder::finalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedSchedule {
    pub pattern: WeeklyPattern,
    pub ledger: ConflictLedger,
    /// The pattern expanded over the detector horizon. Occurrences that collide
    /// with the snapshot are `Conflicted`.
    pub occurrences: Vec<Occurrence>,
}

impl FinalizedSchedule {
    /// Re-run detection against a fresh snapshot, keeping ledger order.
    ///
    /// The snapshot a session started with may be stale by the time it finishes.
    /// Callers run this immediately before persisting.
    pub fn revalidate(&self, detector: &ConflictDetector) -> ConflictLedger {
        let entries = self
            .ledger
            .entries
            .iter()
            .map(|e| LedgerEntry::new(e.slot, detector.detect(&e.slot), e.outside_availability))
            .collect();
        ConflictLedger { entries }
    }

    pub fn is_clean(&self) -> bool {
        self.ledger.is_clean()
    }

    /// Serialize the whole result as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// One booking session's in-progress weekly schedule.
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    pattern: WeeklyPattern,
    ledger: Vec<LedgerEntry>,
    detector: ConflictDetector,
    policy: SchedulePolicy,
    availability: Option<WeeklyPattern>,
}

impl ScheduleBuilder {
    /// A builder checking against `detector`'s snapshot with the default policy.
    pub fn new(detector: ConflictDetector) -> Self {
        Self {
            pattern: WeeklyPattern::new(),
            ledger: Vec::new(),
            detector,
            policy: SchedulePolicy::default(),
            availability: None,
        }
    }

    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Flag slots that fall outside the tutor's weekly availability.
    pub fn with_availability(mut self, availability: WeeklyPattern) -> Self {
        self.availability = Some(availability);
        self.recompute(|_| true);
        self
    }

    /// Validate and add a slot from raw clock values.
    ///
    /// # Errors
    /// `InvalidRange` when `to <= from`, `TooShort` below the policy minimum,
    /// `SameDayOverlap` when it overlaps a slot already in this schedule.
    pub fn add_slot(
        &mut self,
        weekday: Weekday,
        from: NaiveTime,
        to: NaiveTime,
    ) -> Result<SlotStatus> {
        let interval = Interval::new(from, to)?;
        self.add(Slot::new(weekday, interval))
    }

    /// Add an already-built slot. Same checks as [`add_slot`](Self::add_slot)
    /// minus interval construction.
    pub fn add(&mut self, slot: Slot) -> Result<SlotStatus> {
        let actual = slot.interval.duration_minutes();
        let minimum = self.policy.min_duration_minutes;
        if actual < minimum {
            return Err(ScheduleError::TooShort { actual, minimum });
        }

        self.pattern.add_slot(slot.weekday, slot.interval)?;

        let entry = self.evaluate(slot);
        let status = entry.status;
        info!(
            slot = %slot,
            ?status,
            matches = entry.matches.len(),
            "added slot"
        );
        self.ledger.push(entry);
        Ok(status)
    }

    /// Remove the slot at `index` (insertion order) and return it.
    ///
    /// Entries sharing the removed slot's weekday are recomputed.
    ///
    /// # Errors
    /// Returns `ScheduleError::IndexOutOfRange` for an unknown index.
    pub fn remove_slot(&mut self, index: usize) -> Result<Slot> {
        let slot = match self.ledger.get(index) {
            Some(entry) => entry.slot,
            None => {
                return Err(ScheduleError::IndexOutOfRange {
                    index,
                    len: self.ledger.len(),
                })
            }
        };

        self.pattern.remove_slot(slot.weekday, slot.interval)?;
        self.ledger.remove(index);
        self.recompute(|s| s.weekday == slot.weekday);

        info!(slot = %slot, remaining = self.ledger.len(), "removed slot");
        Ok(slot)
    }

    /// Remove several slots at once and return them in ascending index order.
    ///
    /// Every index refers to insertion order as it stands before this call, so
    /// removing `[0, 1]` drops the first two slots. Nothing is removed unless
    /// every index is valid.
    ///
    /// # Errors
    /// `DuplicateIndex` when an index repeats, `IndexOutOfRange` for an unknown one.
    pub fn remove_slots(&mut self, indices: &[usize]) -> Result<Vec<Slot>> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ScheduleError::DuplicateIndex(pair[0]));
        }
        if let Some(&index) = sorted.last() {
            if index >= self.ledger.len() {
                return Err(ScheduleError::IndexOutOfRange {
                    index,
                    len: self.ledger.len(),
                });
            }
        }

        // Highest first so the remaining indices stay valid.
        let mut removed = sorted
            .iter()
            .rev()
            .map(|&index| self.remove_slot(index))
            .collect::<Result<Vec<_>>>()?;
        removed.reverse();
        Ok(removed)
    }

    /// Swap in a fresh commitments snapshot and recompute every entry.
    pub fn replace_commitments(&mut self, detector: ConflictDetector) {
        self.detector = detector;
        self.recompute(|_| true);
    }

    pub fn ledger(&self) -> ConflictLedger {
        ConflictLedger {
            entries: self.ledger.clone(),
        }
    }

    /// Slots in insertion order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.ledger.iter().map(|e| &e.slot)
    }

    pub fn pattern(&self) -> &WeeklyPattern {
        &self.pattern
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// The current pattern expanded over the detector horizon, with colliding
    /// occurrences marked `Conflicted`.
    pub fn occurrences(&self) -> Result<Vec<Occurrence>> {
        expand_within(&self.pattern, self.detector.horizon())
            .into_iter()
            .map(|mut o| {
                if self.detector.occurrence_conflicts(&o) {
                    o.mark_conflicted()?;
                }
                Ok(o)
            })
            .collect()
    }

    /// Snapshot the schedule and its ledger.
    ///
    /// # Errors
    /// Returns `ScheduleError::EmptySchedule` when no slots remain.
    pub fn finalize(&self) -> Result<FinalizedSchedule> {
        if self.is_empty() {
            return Err(ScheduleError::EmptySchedule);
        }

        let finalized = FinalizedSchedule {
            pattern: self.pattern.clone(),
            ledger: self.ledger(),
            occurrences: self.occurrences()?,
        };
        info!(
            slots = finalized.pattern.len(),
            conflicting = finalized.ledger.conflicting().count(),
            "finalized schedule"
        );
        Ok(finalized)
    }

    fn evaluate(&self, slot: Slot) -> LedgerEntry {
        let matches = self.detector.detect(&slot);
        let outside = self
            .availability
            .as_ref()
            .is_some_and(|availability| !covers(availability, &slot));
        LedgerEntry::new(slot, matches, outside)
    }

    fn recompute<F>(&mut self, affected: F)
    where
        F: Fn(&Slot) -> bool,
    {
        let mut recomputed = 0;
        for i in 0..self.ledger.len() {
            let slot = self.ledger[i].slot;
            if affected(&slot) {
                self.ledger[i] = self.evaluate(slot);
                recomputed += 1;
            }
        }
        debug!(recomputed, "recomputed ledger entries");
    }
}

//! Property-based tests for intervals, expansion and the schedule builder.
//!
//! These check invariants that must hold for *any* valid input, not just the
//! examples in the per-module test files.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use lesson_engine::weekday::{self, WEEK};
use lesson_engine::{
    expand, Commitments, ConflictDetector, Horizon, Interval, Occurrence, ScheduleBuilder,
    SchedulePolicy, Slot, WeeklyPattern,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Minutes since midnight on a 5-minute grid, so touching cases come up often.
fn arb_minute() -> impl Strategy<Value = u32> {
    (0u32..288).prop_map(|m| m * 5)
}

fn time_at(minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap()
}

/// A valid interval anywhere in the day.
fn arb_interval() -> impl Strategy<Value = Interval> {
    (arb_minute(), 1u32..=48).prop_filter_map("interval must end before midnight", |(start, len)| {
        let end = start + len * 5;
        if end >= 24 * 60 {
            return None;
        }
        Interval::new(time_at(start), time_at(end)).ok()
    })
}

fn arb_slot() -> impl Strategy<Value = Slot> {
    (0u8..7, arb_interval())
        .prop_map(|(day, interval)| Slot::new(weekday::from_index(day).unwrap(), interval))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    let origin = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    (0i64..730).prop_map(move |offset| origin + Duration::days(offset))
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: overlap is symmetric and matches the half-open definition
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn overlap_symmetric_and_half_open(a in arb_interval(), b in arb_interval()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));

        let expected = a.start() < b.end() && b.start() < a.end();
        prop_assert_eq!(a.overlaps(&b), expected);

        if a.end() <= b.start() || b.end() <= a.start() {
            prop_assert!(!a.overlaps(&b), "{} and {} are disjoint or touching", a, b);
        }
        prop_assert_eq!(a.overlap_minutes(&b), b.overlap_minutes(&a));
    }
}

// ---------------------------------------------------------------------------
// Property 2: expansion is sorted, on the right weekdays, inside the horizon
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_sorted_and_on_pattern_weekdays(
        slots in prop::collection::vec(arb_slot(), 0..6),
        start in arb_date(),
        days in 0i64..120,
    ) {
        // Drop slots that collide with ones already accepted.
        let mut pattern = WeeklyPattern::new();
        for s in slots {
            let _ = pattern.add_slot(s.weekday, s.interval);
        }
        let end = start + Duration::days(days);

        let occurrences = expand(&pattern, start, end);

        for w in occurrences.windows(2) {
            prop_assert!(
                (w[0].date(), w[0].interval().start()) < (w[1].date(), w[1].interval().start()),
                "occurrences not strictly ordered: {:?} then {:?}", w[0], w[1]
            );
        }
        for o in &occurrences {
            prop_assert!(start <= o.date() && o.date() <= end);
            prop_assert!(pattern.contains(&Slot::new(o.date().weekday(), o.interval())));
        }

        // Each weekday yields (matching dates x slots on that day) occurrences.
        let horizon = Horizon::new(start, end);
        for day in WEEK {
            let dates = horizon.days().filter(|d| d.weekday() == day).count();
            let per_day = pattern.slots_on(day).count();
            let got = occurrences.iter().filter(|o| o.weekday() == day).count();
            prop_assert_eq!(got, dates * per_day);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: finalized entries are sorted regardless of insertion order
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn finalize_returns_sorted_entries(slots in prop::collection::vec(arb_slot(), 1..10)) {
        let horizon = Horizon::weeks_from(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 2);
        let detector = ConflictDetector::new(Commitments::default(), horizon);
        let mut builder = ScheduleBuilder::new(detector)
            .with_policy(SchedulePolicy::default().with_min_duration(0));

        let mut accepted = Vec::new();
        for s in slots {
            if builder.add(s).is_ok() {
                accepted.push(s);
            }
        }
        prop_assume!(!accepted.is_empty());

        let finalized = builder.finalize().unwrap();
        accepted.sort();
        let entries: Vec<Slot> = finalized.pattern.entries().copied().collect();
        prop_assert_eq!(entries, accepted);
        prop_assert!(finalized.ledger.is_clean(), "no commitments means no conflicts");
    }
}

// ---------------------------------------------------------------------------
// Property 4: a failed add never changes the builder
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn failed_add_leaves_builder_unchanged(
        first in prop::collection::vec(arb_slot(), 1..6),
        next in arb_slot(),
    ) {
        let horizon = Horizon::weeks_from(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 1);
        let detector = ConflictDetector::new(Commitments::default(), horizon);
        let mut builder = ScheduleBuilder::new(detector);
        for s in first {
            let _ = builder.add(s);
        }

        let before_pattern = builder.pattern().clone();
        let before_ledger = builder.ledger();

        if builder.add(next).is_err() {
            prop_assert_eq!(builder.pattern(), &before_pattern);
            prop_assert_eq!(builder.ledger(), before_ledger);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: the ledger agrees with detection after any edit sequence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Edit {
    Add(Slot),
    Remove(usize),
    /// Swap to the other commitments snapshot.
    Refresh,
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => arb_slot().prop_map(Edit::Add),
        1 => (0usize..8).prop_map(Edit::Remove),
        1 => Just(Edit::Refresh),
    ]
}

/// Weekly slots plus dated bookings inside the first two weeks of March 2026.
fn arb_commitments() -> impl Strategy<Value = Commitments> {
    let origin = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    (
        prop::collection::vec(arb_slot(), 0..4),
        prop::collection::vec((0i64..14, arb_interval()), 0..8),
    )
        .prop_map(move |(weekly, dated)| {
            let occurrences = dated
                .into_iter()
                .map(|(offset, interval)| {
                    Occurrence::new(origin + Duration::days(offset), interval)
                })
                .collect();
            Commitments::new(weekly, occurrences)
        })
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn ledger_matches_detection_after_edits(
        first in arb_commitments(),
        second in arb_commitments(),
        edits in prop::collection::vec(arb_edit(), 1..20),
    ) {
        let horizon = Horizon::weeks_from(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 2);
        let snapshots = [
            ConflictDetector::new(first, horizon),
            ConflictDetector::new(second, horizon),
        ];
        let mut current = 0;
        let mut builder = ScheduleBuilder::new(snapshots[current].clone())
            .with_policy(SchedulePolicy::default().with_min_duration(0));

        for edit in edits {
            match edit {
                Edit::Add(slot) => {
                    let _ = builder.add(slot);
                }
                Edit::Remove(index) => {
                    let len = builder.len();
                    let removed = builder.remove_slot(index);
                    prop_assert_eq!(removed.is_ok(), index < len);
                }
                Edit::Refresh => {
                    current = 1 - current;
                    builder.replace_commitments(snapshots[current].clone());
                }
            }

            let detector = &snapshots[current];
            let ledger = builder.ledger();
            for entry in ledger.entries() {
                let expected = detector.detect(entry.slot());
                prop_assert_eq!(entry.matches(), expected.as_slice());
                prop_assert_eq!(entry.is_conflicting(), !entry.matches().is_empty());
            }

            let mut slots: Vec<Slot> = ledger.entries().iter().map(|e| *e.slot()).collect();
            slots.sort();
            let entries: Vec<Slot> = builder.pattern().entries().copied().collect();
            prop_assert_eq!(entries, slots);
        }
    }
}

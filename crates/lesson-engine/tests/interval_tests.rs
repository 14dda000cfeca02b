//! Tests for half-open time-of-day intervals.

use chrono::NaiveTime;
use lesson_engine::{Interval, ScheduleError};

fn t(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

fn iv(fh: u32, fm: u32, th: u32, tm: u32) -> Interval {
    Interval::from_hm(fh, fm, th, tm).unwrap()
}

// ── Construction ────────────────────────────────────────────────────────────

#[test]
fn zero_length_interval_rejected() {
    let err = Interval::new(t(10, 0), t(10, 0)).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::InvalidRange {
            from: t(10, 0),
            to: t(10, 0)
        }
    );
}

#[test]
fn inverted_interval_rejected() {
    let err = Interval::new(t(10, 30), t(10, 0)).unwrap_err();
    assert!(
        matches!(err, ScheduleError::InvalidRange { .. }),
        "expected InvalidRange, got {:?}",
        err
    );
}

#[test]
fn out_of_range_clock_value_rejected() {
    let err = Interval::from_hm(9, 0, 25, 0).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidTime(_)));
}

#[test]
fn parse_accepts_hh_mm_pairs() {
    let interval = Interval::parse("09:00-10:30").unwrap();
    assert_eq!(interval.start(), t(9, 0));
    assert_eq!(interval.end(), t(10, 30));
    assert_eq!(interval.to_string(), "09:00-10:30");
}

#[test]
fn parse_rejects_garbage() {
    assert!(matches!(
        Interval::parse("nine to ten").unwrap_err(),
        ScheduleError::InvalidTime(_)
    ));
    assert!(matches!(
        Interval::parse("10:00-09:00").unwrap_err(),
        ScheduleError::InvalidRange { .. }
    ));
}

// ── Overlap ─────────────────────────────────────────────────────────────────

#[test]
fn overlapping_intervals_detected() {
    let a = iv(9, 0, 10, 0);
    let b = iv(9, 30, 10, 30);
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
    assert_eq!(a.overlap_minutes(&b), 30);
}

#[test]
fn touching_intervals_do_not_overlap() {
    // [09:00, 10:00) and [10:00, 11:00) share only the boundary.
    let a = iv(9, 0, 10, 0);
    let b = iv(10, 0, 11, 0);
    assert!(!a.overlaps(&b), "touching endpoints must not conflict");
    assert!(!b.overlaps(&a));
    assert_eq!(a.overlap_minutes(&b), 0);
}

#[test]
fn contained_interval_overlaps_for_its_full_length() {
    let outer = iv(9, 0, 12, 0);
    let inner = iv(10, 0, 11, 0);
    assert!(outer.overlaps(&inner));
    assert!(outer.contains(&inner));
    assert!(!inner.contains(&outer));
    assert_eq!(outer.overlap_minutes(&inner), 60);
}

#[test]
fn contains_time_is_half_open() {
    let a = iv(9, 0, 10, 0);
    assert!(a.contains_time(t(9, 0)));
    assert!(a.contains_time(t(9, 59)));
    assert!(!a.contains_time(t(10, 0)));
}

#[test]
fn duration_in_minutes() {
    assert_eq!(iv(9, 0, 10, 0).duration_minutes(), 60);
    assert_eq!(iv(14, 15, 15, 0).duration_minutes(), 45);
}

// ── Serde ───────────────────────────────────────────────────────────────────

#[test]
fn deserialize_validates_range() {
    let ok: Interval = serde_json::from_str(r#"{"from":"09:00","to":"10:00"}"#).unwrap();
    assert_eq!(ok, iv(9, 0, 10, 0));

    let err = serde_json::from_str::<Interval>(r#"{"from":"10:00","to":"10:00"}"#);
    assert!(err.is_err(), "zero-length interval must not deserialize");
}

#[test]
fn serializes_as_hh_mm() {
    let json = serde_json::to_string(&iv(9, 5, 10, 0)).unwrap();
    assert_eq!(json, r#"{"from":"09:05","to":"10:00"}"#);
}

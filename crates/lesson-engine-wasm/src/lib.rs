//! WASM bindings for lesson-engine.
//!
//! Exposes pattern expansion, conflict detection, schedule checks and free
//! windows to JavaScript via `wasm-bindgen`. All complex types are passed as
//! JSON strings; weekdays are integers with `0 = Sunday`, matching `Date.getDay()`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p lesson-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/lesson-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/lesson_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use lesson_engine::availability::weekly_free_windows;
use lesson_engine::{
    expand, Commitments, ConflictDetector, ConflictLedger, ConflictMatch, Horizon, Occurrence,
    ScheduleBuilder, SchedulePolicy, Slot, WeeklyPattern,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

/// A slot as typed by the user, validated individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotInput {
    weekday: u8,
    from: String,
    to: String,
}

/// Input for `checkSchedule`.
#[derive(Deserialize)]
struct ScheduleRequest {
    horizon: Horizon,
    #[serde(default)]
    commitments: Commitments,
    #[serde(default)]
    availability: Option<WeeklyPattern>,
    #[serde(default)]
    policy: SchedulePolicy,
    slots: Vec<SlotInput>,
    /// Positions in `slots` to drop once every slot is added.
    #[serde(default)]
    remove: Vec<usize>,
}

#[derive(Serialize)]
struct RejectedDto {
    index: usize,
    slot: SlotInput,
    error: String,
}

#[derive(Serialize)]
struct ScheduleReportDto {
    pattern: WeeklyPattern,
    ledger: ConflictLedger,
    occurrences: Vec<Occurrence>,
    rejected: Vec<RejectedDto>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` date.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn from_json<'a, T: Deserialize<'a>>(json: &'a str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn expand_pattern_json(pattern_json: &str, start: &str, end: &str) -> Result<String, String> {
    let pattern: WeeklyPattern = from_json(pattern_json, "pattern")?;
    let occurrences = expand(&pattern, parse_date(start)?, parse_date(end)?);
    to_json(&occurrences)
}

fn detect_conflicts_json(
    candidate_json: &str,
    commitments_json: &str,
    start: &str,
    end: &str,
) -> Result<String, String> {
    let candidate: Slot = from_json(candidate_json, "candidate slot")?;
    let commitments: Commitments = from_json(commitments_json, "commitments")?;
    let horizon = Horizon::new(parse_date(start)?, parse_date(end)?);

    let detector = ConflictDetector::new(commitments, horizon);
    let matches: Vec<ConflictMatch> = detector.detect(&candidate);
    to_json(&matches)
}

fn check_schedule_json(request_json: &str) -> Result<String, String> {
    let request: ScheduleRequest = from_json(request_json, "schedule request")?;

    let detector = ConflictDetector::new(request.commitments, request.horizon);
    let mut builder = ScheduleBuilder::new(detector).with_policy(request.policy);
    if let Some(availability) = request.availability {
        builder = builder.with_availability(availability);
    }

    let mut rejected = Vec::new();
    let mut positions: Vec<Option<usize>> = Vec::with_capacity(request.slots.len());
    for (index, input) in request.slots.into_iter().enumerate() {
        let added =
            Slot::from_parts(input.weekday, &input.from, &input.to).and_then(|s| builder.add(s));
        match added {
            Ok(_) => positions.push(Some(builder.len() - 1)),
            Err(e) => {
                positions.push(None);
                rejected.push(RejectedDto {
                    index,
                    slot: input,
                    error: e.to_string(),
                });
            }
        }
    }

    let targets = request
        .remove
        .iter()
        .map(|&index| match positions.get(index) {
            Some(Some(position)) => Ok(*position),
            Some(None) => Err(format!("Cannot remove slot {}: it was rejected", index)),
            None => Err(format!(
                "Cannot remove slot {}: request has {} slots",
                index,
                positions.len()
            )),
        })
        .collect::<Result<Vec<usize>, String>>()?;
    builder
        .remove_slots(&targets)
        .map_err(|e| format!("Failed to remove slots {:?}: {}", request.remove, e))?;

    let finalized = builder.finalize().map_err(|e| e.to_string())?;
    to_json(&ScheduleReportDto {
        pattern: finalized.pattern,
        ledger: finalized.ledger,
        occurrences: finalized.occurrences,
        rejected,
    })
}

fn free_windows_json(
    availability_json: &str,
    booked_json: &str,
    min_duration_minutes: i64,
) -> Result<String, String> {
    let availability: WeeklyPattern = from_json(availability_json, "availability")?;
    let booked: Vec<Slot> = from_json(booked_json, "booked slots")?;
    to_json(&weekly_free_windows(&availability, &booked, min_duration_minutes))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand a weekly pattern into dated occurrences.
///
/// `pattern_json` is a JSON array of `{weekday, from, to}` slots. `start` and
/// `end` are inclusive `YYYY-MM-DD` dates. Returns a JSON array of
/// `{date, from, to, status}` objects.
#[wasm_bindgen(js_name = "expandPattern")]
pub fn expand_pattern(pattern_json: &str, start: &str, end: &str) -> Result<String, JsValue> {
    expand_pattern_json(pattern_json, start, end).map_err(|e| JsValue::from_str(&e))
}

/// Detect every conflict for one candidate slot.
///
/// `candidate_json` is a `{weekday, from, to}` object; `commitments_json` is
/// `{weekly: [...], occurrences: [...]}`. Recurring matches come first, then
/// dated matches over the `start..=end` horizon.
#[wasm_bindgen(js_name = "detectConflicts")]
pub fn detect_conflicts(
    candidate_json: &str,
    commitments_json: &str,
    start: &str,
    end: &str,
) -> Result<String, JsValue> {
    detect_conflicts_json(candidate_json, commitments_json, start, end)
        .map_err(|e| JsValue::from_str(&e))
}

/// Replay a whole booking session and return the conflict report.
///
/// Invalid slots are listed under `rejected` rather than failing the call. The
/// optional `remove` list holds positions in `slots` to drop afterwards. Fails
/// when a removal points at a rejected or unknown slot, or when no slot survives.
#[wasm_bindgen(js_name = "checkSchedule")]
pub fn check_schedule(request_json: &str) -> Result<String, JsValue> {
    check_schedule_json(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Free windows left in a tutor's weekly availability after booked slots.
#[wasm_bindgen(js_name = "freeWindows")]
pub fn free_windows(
    availability_json: &str,
    booked_json: &str,
    min_duration_minutes: i32,
) -> Result<String, JsValue> {
    free_windows_json(availability_json, booked_json, i64::from(min_duration_minutes))
        .map_err(|e| JsValue::from_str(&e))
}

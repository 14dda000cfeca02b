//! `lessons`: check, expand and inspect weekly lesson schedules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Replay a booking session and print the conflict report (stdin → stdout)
//! cat session.json | lessons check
//!
//! # Same, from file to file, allowing 15-minute lessons
//! lessons check -i session.json -o report.json --min-duration 15
//!
//! # Expand a weekly pattern into dated occurrences
//! lessons expand -i pattern.json --start 2026-03-02 --end 2026-03-29
//!
//! # List a tutor's remaining free windows
//! lessons free -i tutor.json
//!
//! # More logging on stderr
//! lessons -vv check -i session.json
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use lesson_engine::availability::{weekly_free_windows, FreeWindow};
use lesson_engine::policy::DEFAULT_MIN_DURATION_MINUTES;
use lesson_engine::{
    expand, Commitments, ConflictDetector, ConflictLedger, Horizon, Occurrence, ScheduleBuilder,
    SchedulePolicy, Slot, WeeklyPattern,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(
    name = "lessons",
    version,
    about = "Weekly lesson schedule conflict checker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a booking session and report per-slot conflicts
    Check {
        /// Session request JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Report output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Shortest lesson accepted, in minutes
        #[arg(long, default_value_t = DEFAULT_MIN_DURATION_MINUTES)]
        min_duration: i64,
    },
    /// Expand a weekly pattern into dated occurrences
    Expand {
        /// Pattern JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// First date of the horizon (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last date of the horizon, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
    },
    /// List free windows left in a tutor's weekly availability
    Free {
        /// Availability JSON (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Drop windows shorter than this many minutes
        #[arg(long, default_value_t = DEFAULT_MIN_DURATION_MINUTES)]
        min_duration: i64,
    },
}

/// A proposed slot as typed by the user. Validated one by one so a single bad
/// slot is reported instead of failing the whole request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SlotRequest {
    weekday: u8,
    from: String,
    to: String,
}

/// Input for `lessons check`.
#[derive(Debug, Deserialize)]
struct SessionRequest {
    horizon: Horizon,
    #[serde(default)]
    existing_weekly: Vec<Slot>,
    #[serde(default)]
    existing_occurrences: Vec<Occurrence>,
    #[serde(default)]
    availability: Option<WeeklyPattern>,
    slots: Vec<SlotRequest>,
    /// Positions in `slots` to drop after every slot is added. Each must point at
    /// a slot that was accepted.
    #[serde(default)]
    remove: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct Rejection {
    index: usize,
    slot: SlotRequest,
    error: String,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    pattern: WeeklyPattern,
    ledger: ConflictLedger,
    occurrences: Vec<Occurrence>,
    rejected: Vec<Rejection>,
}

/// Input for `lessons free`.
#[derive(Debug, Deserialize)]
struct FreeRequest {
    availability: WeeklyPattern,
    #[serde(default)]
    booked: Vec<Slot>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            input,
            output,
            min_duration,
        } => {
            let raw = read_input(input.as_deref())?;
            let request: SessionRequest =
                serde_json::from_str(&raw).context("Failed to parse session request JSON")?;
            let policy = SchedulePolicy::default().with_min_duration(min_duration);
            let report = run_session(request, policy)?;
            let json = serde_json::to_string_pretty(&report)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Expand {
            input,
            output,
            start,
            end,
        } => {
            let raw = read_input(input.as_deref())?;
            let pattern: WeeklyPattern =
                serde_json::from_str(&raw).context("Failed to parse weekly pattern JSON")?;
            let occurrences = expand(&pattern, start, end);
            info!(count = occurrences.len(), "expanded pattern");
            let json = serde_json::to_string_pretty(&occurrences)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Free {
            input,
            output,
            min_duration,
        } => {
            let raw = read_input(input.as_deref())?;
            let request: FreeRequest =
                serde_json::from_str(&raw).context("Failed to parse availability JSON")?;
            let windows: Vec<FreeWindow> =
                weekly_free_windows(&request.availability, &request.booked, min_duration);
            let json = serde_json::to_string_pretty(&windows)?;
            write_output(output.as_deref(), &json)?;
        }
    }

    Ok(())
}

/// Replay a session: add every slot, apply removals, then finalize.
///
/// Validation errors on individual slots are collected into `rejected`; only an
/// empty final schedule aborts the run.
fn run_session(request: SessionRequest, policy: SchedulePolicy) -> Result<SessionReport> {
    let detector = ConflictDetector::new(
        Commitments::new(request.existing_weekly, request.existing_occurrences),
        request.horizon,
    );
    let mut builder = ScheduleBuilder::new(detector).with_policy(policy);
    if let Some(availability) = request.availability {
        builder = builder.with_availability(availability);
    }

    let mut rejected = Vec::new();
    // Builder position of each request slot, `None` when it was rejected.
    let mut positions: Vec<Option<usize>> = Vec::with_capacity(request.slots.len());
    for (index, raw) in request.slots.into_iter().enumerate() {
        let added =
            Slot::from_parts(raw.weekday, &raw.from, &raw.to).and_then(|slot| builder.add(slot));
        match added {
            Ok(_) => positions.push(Some(builder.len() - 1)),
            Err(e) => {
                warn!(index, error = %e, "rejected slot");
                positions.push(None);
                rejected.push(Rejection {
                    index,
                    slot: raw,
                    error: e.to_string(),
                });
            }
        }
    }

    if !request.remove.is_empty() {
        let targets = request
            .remove
            .iter()
            .map(|&index| match positions.get(index) {
                Some(Some(position)) => Ok(*position),
                Some(None) => bail!("Cannot remove slot {}: it was rejected", index),
                None => bail!(
                    "Cannot remove slot {}: request has {} slots",
                    index,
                    positions.len()
                ),
            })
            .collect::<Result<Vec<usize>>>()?;
        builder
            .remove_slots(&targets)
            .with_context(|| format!("Failed to remove slots {:?}", request.remove))?;
        info!(removed = targets.len(), "removed slots");
    }

    let finalized = builder
        .finalize()
        .context("No slots left to check; every slot was rejected or removed")?;

    Ok(SessionReport {
        pattern: finalized.pattern,
        ledger: finalized.ledger,
        occurrences: finalized.occurrences,
        rejected,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

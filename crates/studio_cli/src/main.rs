//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `studio_core` linkage (`ping`, version).
//! - Optionally render a week summary and reminder badge from a JSON
//!   workspace snapshot, for quick local sanity checks.
//!
//! Usage: `studio_cli [snapshot.json]`

use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use std::process::ExitCode;
use studio_core::model::date::serde_date;
use studio_core::{
    collect_deadline_items, format_calendar_date, normalize_registrations, week_start, CoreConfig,
    Person, Project, Registration, Task, WeekGrid,
};

/// Host-side snapshot of everything the core consumes.
#[derive(Debug, Deserialize)]
struct WorkspaceSnapshot {
    #[serde(default)]
    config: CoreConfig,
    roster: Vec<Person>,
    #[serde(default)]
    registrations: Vec<Registration>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(with = "serde_date")]
    today: NaiveDate,
    viewer: String,
}

fn main() -> ExitCode {
    println!("studio_core ping={}", studio_core::ping());
    println!("studio_core version={}", studio_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match summarize(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(path: &str) -> Result<(), Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: WorkspaceSnapshot = serde_json::from_str(&raw)?;
    snapshot.config.validate()?;

    let viewer = snapshot
        .roster
        .iter()
        .find(|person| person.id == snapshot.viewer)
        .ok_or_else(|| format!("viewer `{}` is not in the roster", snapshot.viewer))?
        .actor();
    let registrations = normalize_registrations(snapshot.registrations);

    let grid = WeekGrid::build(
        &snapshot.roster,
        &registrations,
        week_start(snapshot.today)?,
        snapshot.config.days_per_week,
        &viewer,
    )?;
    println!(
        "week {}..{} staff={}",
        format_calendar_date(grid.week_start),
        format_calendar_date(grid.week_end()),
        grid.rows.len()
    );
    for (day, count) in grid.days.iter().zip(&grid.footer) {
        println!(
            "  {} morning={} afternoon={}",
            format_calendar_date(*day),
            count.morning_count,
            count.afternoon_count
        );
    }

    let items = collect_deadline_items(&snapshot.projects, &snapshot.tasks);
    let scanner = snapshot.config.urgency_scanner();
    let urgent = scanner.scan(&items, snapshot.today, &viewer);
    println!("reminders={}", urgent.len());
    for entry in &urgent {
        println!(
            "  [{:?}] {} days_remaining={}",
            entry.kind, entry.item.label, entry.days_remaining
        );
    }
    Ok(())
}

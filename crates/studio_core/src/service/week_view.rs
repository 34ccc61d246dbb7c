//! Week navigation and the roster × day schedule grid.
//!
//! # Responsibility
//! - Anchor weeks on Monday and navigate between them.
//! - Project a registration snapshot into grid rows and a headcount footer.
//!
//! # Invariants
//! - Footer counts always equal a recount of the grid's source snapshot.
//! - External viewers never get a row.

use crate::model::date::format_calendar_date;
use crate::model::person::{schedulable_roster, Actor, Person, Role};
use crate::model::registration::{Headcount, PersonId, Registration, SessionStatus};
use crate::service::session_registry::{headcount, session_status, ScheduleError};
use chrono::{Datelike, Days, NaiveDate};
use log::debug;
use serde::Serialize;

/// Studio schedules Monday through Saturday.
pub const DEFAULT_DAYS_PER_WEEK: u32 = 6;

/// Monday of the week containing `date`. Sunday belongs to the week that
/// started six days earlier.
///
/// # Errors
/// - `ScheduleError::InvalidArgument` when that Monday precedes the first
///   representable date.
pub fn week_start(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).ok_or_else(|| {
        ScheduleError::InvalidArgument(format!(
            "week of {} starts before the first supported date",
            format_calendar_date(date)
        ))
    })
}

/// Moves a week anchor by `weeks` (negative goes back).
///
/// # Errors
/// - `ScheduleError::InvalidArgument` when the target week is outside the
///   supported date range.
pub fn shift_weeks(week_start: NaiveDate, weeks: i64) -> Result<NaiveDate, ScheduleError> {
    let shifted = match weeks.checked_mul(7).map(|days| Days::new(days.unsigned_abs())) {
        Some(days) if weeks >= 0 => week_start.checked_add_days(days),
        Some(days) => week_start.checked_sub_days(days),
        None => None,
    };
    shifted.ok_or_else(|| {
        ScheduleError::InvalidArgument(format!(
            "cannot shift week {} by {weeks} weeks",
            format_calendar_date(week_start)
        ))
    })
}

/// Consecutive schedulable dates starting at `week_start`.
///
/// # Errors
/// - `ScheduleError::InvalidArgument` unless `1 <= days_per_week <= 7`, or
///   when the week runs past the last supported date.
pub fn week_days(week_start: NaiveDate, days_per_week: u32) -> Result<Vec<NaiveDate>, ScheduleError> {
    if !(1..=7).contains(&days_per_week) {
        return Err(ScheduleError::InvalidArgument(format!(
            "days_per_week must be within 1..=7, got {days_per_week}"
        )));
    }
    let days: Vec<NaiveDate> = week_start
        .iter_days()
        .take(days_per_week as usize)
        .collect();
    if days.len() != days_per_week as usize {
        return Err(ScheduleError::InvalidArgument(format!(
            "week {} runs past the last supported date",
            format_calendar_date(week_start)
        )));
    }
    Ok(days)
}

/// One grid row: a schedulable person and their cells for the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    pub person_id: PersonId,
    pub name: String,
    pub role: Role,
    /// Row belongs to the viewer.
    pub is_viewer: bool,
    /// Viewer may press this row's buttons.
    pub can_edit: bool,
    pub cells: Vec<SessionStatus>,
}

/// Rendered week: rows per schedulable person plus per-day totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekGrid {
    pub week_start: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<WeekRow>,
    pub footer: Vec<Headcount>,
}

impl WeekGrid {
    /// Builds the grid from one snapshot so rows and footer never diverge.
    pub fn build(
        roster: &[Person],
        registrations: &[Registration],
        week_start: NaiveDate,
        days_per_week: u32,
        viewer: &Actor,
    ) -> Result<Self, ScheduleError> {
        let days = week_days(week_start, days_per_week)?;

        let rows: Vec<WeekRow> = schedulable_roster(roster)
            .into_iter()
            .map(|person| WeekRow {
                person_id: person.id.clone(),
                name: person.name.clone(),
                role: person.role,
                is_viewer: person.id == viewer.person_id,
                can_edit: viewer.can_write_for(&person.id),
                cells: days
                    .iter()
                    .map(|day| session_status(registrations, &person.id, *day))
                    .collect(),
            })
            .collect();
        let footer: Vec<Headcount> = days
            .iter()
            .map(|day| headcount(registrations, *day))
            .collect();

        debug!(
            "event=week_grid_build module=week status=ok week_start={} rows={} days={}",
            format_calendar_date(week_start),
            rows.len(),
            days.len()
        );

        Ok(Self {
            week_start,
            days,
            rows,
            footer,
        })
    }

    /// Last schedulable date of the week.
    pub fn week_end(&self) -> NaiveDate {
        self.days.last().copied().unwrap_or(self.week_start)
    }

    pub fn row(&self, person_id: &str) -> Option<&WeekRow> {
        self.rows.iter().find(|row| row.person_id == person_id)
    }
}

//! Half-day session registry.
//!
//! # Responsibility
//! - Apply half-day toggles to a registration snapshot under the
//!   owner-or-admin write policy.
//! - Answer per-person status and per-date headcount queries.
//!
//! # Invariants
//! - Inputs are never mutated; every write returns a new collection.
//! - Each key `(person_id, date)` has at most one record after any write.
//! - A toggle that lands on OFF removes the record; ids are stable across
//!   overwrites and generated only on create.

use crate::model::date::{format_calendar_date, parse_calendar_date, DateParseError};
use crate::model::registration::{
    HalfDay, Headcount, PersonId, Registration, SessionStatus, WorkSession,
};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by the strict registry entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The actor is neither the schedule owner nor an administrator.
    PermissionDenied { actor: PersonId, target: PersonId },
    /// Input could not be interpreted (malformed date, bad week length).
    InvalidArgument(String),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { actor, target } => {
                write!(f, "`{actor}` may not edit the schedule of `{target}`")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for ScheduleError {}

impl From<DateParseError> for ScheduleError {
    fn from(value: DateParseError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

pub use crate::model::person::can_write;

/// Presses one half-day button for `person_id` on `date`.
///
/// Unauthorized calls are a silent no-op: the returned collection equals the
/// input. Use [`try_toggle_half_day`] to tell a rejection apart.
pub fn toggle_half_day(
    registrations: &[Registration],
    person_id: &str,
    date: NaiveDate,
    half: HalfDay,
    acting_person_id: &str,
    is_admin: bool,
) -> Vec<Registration> {
    if !can_write(person_id, acting_person_id, is_admin) {
        debug!(
            "event=session_toggle module=registry status=ignored actor={} target={} date={}",
            acting_person_id,
            person_id,
            format_calendar_date(date)
        );
        return registrations.to_vec();
    }

    apply_toggle(registrations, person_id, date, half)
}

/// Strict variant of [`toggle_half_day`].
///
/// # Errors
/// - `ScheduleError::PermissionDenied` when the actor may not write.
pub fn try_toggle_half_day(
    registrations: &[Registration],
    person_id: &str,
    date: NaiveDate,
    half: HalfDay,
    acting_person_id: &str,
    is_admin: bool,
) -> Result<Vec<Registration>, ScheduleError> {
    if !can_write(person_id, acting_person_id, is_admin) {
        warn!(
            "event=session_toggle module=registry status=denied actor={} target={} date={}",
            acting_person_id,
            person_id,
            format_calendar_date(date)
        );
        return Err(ScheduleError::PermissionDenied {
            actor: acting_person_id.to_string(),
            target: person_id.to_string(),
        });
    }

    Ok(apply_toggle(registrations, person_id, date, half))
}

/// Toggle entry point for hosts holding the `YYYY-MM-DD` wire encoding.
///
/// Authorization keeps the silent no-op policy of [`toggle_half_day`].
///
/// # Errors
/// - `ScheduleError::InvalidArgument` when `date` is malformed.
pub fn toggle_half_day_str(
    registrations: &[Registration],
    person_id: &str,
    date: &str,
    half: HalfDay,
    acting_person_id: &str,
    is_admin: bool,
) -> Result<Vec<Registration>, ScheduleError> {
    let date = parse_calendar_date(date)?;
    Ok(toggle_half_day(
        registrations,
        person_id,
        date,
        half,
        acting_person_id,
        is_admin,
    ))
}

fn apply_toggle(
    registrations: &[Registration],
    person_id: &str,
    date: NaiveDate,
    half: HalfDay,
) -> Vec<Registration> {
    let current = current_session(registrations, person_id, date);
    let next = current.toggled(half);

    let mut next_regs = Vec::with_capacity(registrations.len() + 1);
    let mut placed = false;
    for reg in registrations {
        if !reg.matches(person_id, date) {
            next_regs.push(reg.clone());
            continue;
        }
        // Stray duplicates of the key are dropped along with OFF records.
        if next == WorkSession::Off || placed {
            continue;
        }
        let mut updated = reg.clone();
        updated.session = next;
        next_regs.push(updated);
        placed = true;
    }

    if next != WorkSession::Off && !placed {
        next_regs.push(Registration::new(person_id, date, next));
    }

    debug!(
        "event=session_toggle module=registry status=ok target={} date={} from={} to={}",
        person_id,
        format_calendar_date(date),
        current.as_str(),
        next.as_str()
    );
    next_regs
}

fn current_session(registrations: &[Registration], person_id: &str, date: NaiveDate) -> WorkSession {
    registration_for(registrations, person_id, date).map_or(WorkSession::Off, |reg| reg.session)
}

/// Returns the stored record for one key, if any.
pub fn registration_for<'a>(
    registrations: &'a [Registration],
    person_id: &str,
    date: NaiveDate,
) -> Option<&'a Registration> {
    registrations.iter().find(|reg| reg.matches(person_id, date))
}

/// Morning/afternoon presence for one person on one date.
pub fn session_status(
    registrations: &[Registration],
    person_id: &str,
    date: NaiveDate,
) -> SessionStatus {
    current_session(registrations, person_id, date).status()
}

/// Counts people present per half-day on `date`.
///
/// Each person counts once, from the same record [`session_status`] reads.
pub fn headcount(registrations: &[Registration], date: NaiveDate) -> Headcount {
    let mut seen: HashSet<&str> = HashSet::new();
    registrations
        .iter()
        .filter(|reg| reg.date == date)
        .filter(|reg| seen.insert(reg.person_id.as_str()))
        .fold(Headcount::default(), |mut count, reg| {
            if reg.session.has_morning() {
                count.morning_count += 1;
            }
            if reg.session.has_afternoon() {
                count.afternoon_count += 1;
            }
            count
        })
}

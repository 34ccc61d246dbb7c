//! Half-day work registration model.
//!
//! # Responsibility
//! - Define the four-valued `WorkSession` state and its bit-pair algebra.
//! - Define the persisted `Registration` record and its wire shape.
//! - Validate registration collections before they are stored.
//!
//! # Invariants
//! - `WorkSession::Off` is never stored; it is the absence of a record.
//! - At most one record exists per `(person_id, date)` key.
//! - `FullDay` is exactly `Morning ∧ Afternoon`.

use crate::model::date::{format_calendar_date, serde_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque person identity. Only equality is meaningful.
pub type PersonId = String;

/// Stable registration record id.
pub type RegistrationId = String;

const REGISTRATION_ID_PREFIX: &str = "wr-";

/// Attendance state for one person on one calendar date.
///
/// Serialized with upper-case labels; the localized labels written by older
/// clients are still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkSession {
    #[serde(alias = "Sáng")]
    Morning,
    #[serde(alias = "Chiều")]
    Afternoon,
    #[serde(alias = "Cả ngày")]
    FullDay,
    #[serde(alias = "Nghỉ")]
    Off,
}

/// One of the two atomic scheduling units of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalfDay {
    Morning,
    Afternoon,
}

impl WorkSession {
    /// Builds the state from its `(morning, afternoon)` bit pair.
    pub fn from_bits(morning: bool, afternoon: bool) -> Self {
        match (morning, afternoon) {
            (true, true) => Self::FullDay,
            (true, false) => Self::Morning,
            (false, true) => Self::Afternoon,
            (false, false) => Self::Off,
        }
    }

    pub fn has_morning(self) -> bool {
        matches!(self, Self::Morning | Self::FullDay)
    }

    pub fn has_afternoon(self) -> bool {
        matches!(self, Self::Afternoon | Self::FullDay)
    }

    /// Returns the state reached by pressing `half`: that half's bit flips,
    /// the other bit is kept.
    pub fn toggled(self, half: HalfDay) -> Self {
        match half {
            HalfDay::Morning => Self::from_bits(!self.has_morning(), self.has_afternoon()),
            HalfDay::Afternoon => Self::from_bits(self.has_morning(), !self.has_afternoon()),
        }
    }

    pub fn status(self) -> SessionStatus {
        SessionStatus {
            morning: self.has_morning(),
            afternoon: self.has_afternoon(),
        }
    }

    /// Stable label used by storage and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "MORNING",
            Self::Afternoon => "AFTERNOON",
            Self::FullDay => "FULL_DAY",
            Self::Off => "OFF",
        }
    }

    /// Parses a stored label. Localized labels are not accepted here.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MORNING" => Some(Self::Morning),
            "AFTERNOON" => Some(Self::Afternoon),
            "FULL_DAY" => Some(Self::FullDay),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }
}

/// Per-person, per-date presence flags rendered as toggle buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub morning: bool,
    pub afternoon: bool,
}

impl SessionStatus {
    pub fn session(self) -> WorkSession {
        WorkSession::from_bits(self.morning, self.afternoon)
    }
}

/// Per-date headcount rendered in the grid footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headcount {
    pub morning_count: usize,
    pub afternoon_count: usize,
}

/// One stored attendance record.
///
/// Wire shape: `{ id, userId, date: "YYYY-MM-DD", session, note? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    #[serde(rename = "userId")]
    pub person_id: PersonId,
    #[serde(with = "serde_date")]
    pub date: NaiveDate,
    pub session: WorkSession,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Registration {
    /// Creates a record with a freshly generated id.
    pub fn new(person_id: impl Into<PersonId>, date: NaiveDate, session: WorkSession) -> Self {
        Self::with_id(generate_registration_id(), person_id, date, session)
    }

    /// Creates a record with a caller-provided id (import paths, tests).
    pub fn with_id(
        id: impl Into<RegistrationId>,
        person_id: impl Into<PersonId>,
        date: NaiveDate,
        session: WorkSession,
    ) -> Self {
        Self {
            id: id.into(),
            person_id: person_id.into(),
            date,
            session,
            note: None,
        }
    }

    /// Returns whether this record belongs to the `(person_id, date)` key.
    pub fn matches(&self, person_id: &str, date: NaiveDate) -> bool {
        self.date == date && self.person_id == person_id
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }
}

/// Generates a new registration id.
pub fn generate_registration_id() -> RegistrationId {
    format!("{REGISTRATION_ID_PREFIX}{}", Uuid::new_v4().simple())
}

/// Validation failures for registration collections about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    EmptyId,
    EmptyPersonId { id: RegistrationId },
    OffRecord { id: RegistrationId },
    DuplicateKey { person_id: PersonId, date: NaiveDate },
    DuplicateId(RegistrationId),
}

impl Display for RegistrationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "registration id must not be empty"),
            Self::EmptyPersonId { id } => write!(f, "registration `{id}` has empty userId"),
            Self::OffRecord { id } => {
                write!(f, "registration `{id}` stores OFF; OFF must be absent")
            }
            Self::DuplicateKey { person_id, date } => write!(
                f,
                "more than one registration for `{person_id}` on {}",
                format_calendar_date(*date)
            ),
            Self::DuplicateId(id) => write!(f, "registration id `{id}` is used twice"),
        }
    }
}

impl Error for RegistrationValidationError {}

/// Checks the storage invariants of one registration collection.
pub fn validate_registrations(
    registrations: &[Registration],
) -> Result<(), RegistrationValidationError> {
    let mut keys = HashSet::with_capacity(registrations.len());
    let mut ids = HashSet::with_capacity(registrations.len());

    for reg in registrations {
        if reg.id.trim().is_empty() {
            return Err(RegistrationValidationError::EmptyId);
        }
        if reg.person_id.trim().is_empty() {
            return Err(RegistrationValidationError::EmptyPersonId { id: reg.id.clone() });
        }
        if reg.session == WorkSession::Off {
            return Err(RegistrationValidationError::OffRecord { id: reg.id.clone() });
        }
        if !keys.insert((reg.person_id.as_str(), reg.date)) {
            return Err(RegistrationValidationError::DuplicateKey {
                person_id: reg.person_id.clone(),
                date: reg.date,
            });
        }
        if !ids.insert(reg.id.as_str()) {
            return Err(RegistrationValidationError::DuplicateId(reg.id.clone()));
        }
    }

    Ok(())
}

/// Restores storage invariants on legacy data loaded from elsewhere.
///
/// OFF records are dropped. When a key occurs more than once the last
/// occurrence wins and keeps its position; earlier ones are discarded.
pub fn normalize_registrations(registrations: Vec<Registration>) -> Vec<Registration> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Registration> = registrations
        .into_iter()
        .rev()
        .filter(|reg| reg.session != WorkSession::Off)
        .filter(|reg| seen.insert((reg.person_id.clone(), reg.date)))
        .collect();
    kept.reverse();
    kept
}

//! Registration store contracts with optimistic versioning.
//!
//! # Responsibility
//! - Load and replace the shared registration collection as one snapshot.
//! - Reject writes computed against a snapshot that is no longer current.
//!
//! # Invariants
//! - Every accepted save bumps the store version by exactly one.
//! - Write paths call `validate_registrations()` before touching storage.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::date::{format_calendar_date, parse_calendar_date};
use crate::model::registration::{
    validate_registrations, Registration, RegistrationValidationError, WorkSession,
};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for registration persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(RegistrationValidationError),
    Db(DbError),
    /// The caller's snapshot is older than the stored one.
    StaleWrite { expected: u64, actual: u64 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::StaleWrite { expected, actual } => write!(
                f,
                "stale write: snapshot version {expected} but store is at {actual}"
            ),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted registration data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::StaleWrite { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<RegistrationValidationError> for RepoError {
    fn from(value: RegistrationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Registration collection together with the store version it was read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSnapshot {
    pub registrations: Vec<Registration>,
    pub version: u64,
}

/// Snapshot store for the shared registration collection.
pub trait RegistrationRepository {
    fn load(&self) -> RepoResult<RegistrationSnapshot>;

    /// Replaces the stored collection and returns the new version.
    ///
    /// Fails with `RepoError::StaleWrite` when `expected_version` is not the
    /// current store version.
    fn save(&self, registrations: &[Registration], expected_version: u64) -> RepoResult<u64>;
}

/// Process-local store for hosts without their own persistence.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationRepository {
    state: RefCell<RegistrationSnapshot>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store; the initial snapshot is version 0.
    pub fn with_registrations(registrations: Vec<Registration>) -> RepoResult<Self> {
        validate_registrations(&registrations)?;
        Ok(Self {
            state: RefCell::new(RegistrationSnapshot {
                registrations,
                version: 0,
            }),
        })
    }
}

impl RegistrationRepository for InMemoryRegistrationRepository {
    fn load(&self) -> RepoResult<RegistrationSnapshot> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, registrations: &[Registration], expected_version: u64) -> RepoResult<u64> {
        validate_registrations(registrations)?;

        let mut state = self.state.borrow_mut();
        if state.version != expected_version {
            warn!(
                "event=registrations_save module=repo status=stale backend=memory expected={} actual={}",
                expected_version, state.version
            );
            return Err(RepoError::StaleWrite {
                expected: expected_version,
                actual: state.version,
            });
        }

        state.registrations = registrations.to_vec();
        state.version += 1;
        Ok(state.version)
    }
}

/// SQLite-backed registration store.
pub struct SqliteRegistrationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrationRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `DbError::SchemaNotReady` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let db_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected = latest_version();
        if db_version != expected {
            return Err(DbError::SchemaNotReady {
                db_version,
                expected,
            }
            .into());
        }
        Ok(Self { conn })
    }

    fn store_version(&self) -> RepoResult<u64> {
        let version: i64 = self.conn.query_row(
            "SELECT version FROM schedule_state WHERE singleton = 1;",
            [],
            |row| row.get(0),
        )?;
        u64::try_from(version)
            .map_err(|_| RepoError::InvalidData(format!("negative store version `{version}`")))
    }
}

impl RegistrationRepository for SqliteRegistrationRepository<'_> {
    fn load(&self) -> RepoResult<RegistrationSnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, work_date, session, note
             FROM work_registrations
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut registrations = Vec::new();
        while let Some(row) = rows.next()? {
            registrations.push(parse_registration_row(row)?);
        }

        Ok(RegistrationSnapshot {
            registrations,
            version: self.store_version()?,
        })
    }

    fn save(&self, registrations: &[Registration], expected_version: u64) -> RepoResult<u64> {
        validate_registrations(registrations)?;
        let started_at = Instant::now();

        let tx = self.conn.unchecked_transaction()?;
        let actual: i64 = tx.query_row(
            "SELECT version FROM schedule_state WHERE singleton = 1;",
            [],
            |row| row.get(0),
        )?;
        if actual != expected_version as i64 {
            warn!(
                "event=registrations_save module=repo status=stale backend=sqlite expected={} actual={}",
                expected_version, actual
            );
            return Err(RepoError::StaleWrite {
                expected: expected_version,
                actual: actual.max(0) as u64,
            });
        }

        let result = (|| -> RepoResult<()> {
            tx.execute("DELETE FROM work_registrations;", [])?;
            let mut insert = tx.prepare(
                "INSERT INTO work_registrations (id, user_id, work_date, session, note, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;
            for (position, reg) in registrations.iter().enumerate() {
                insert.execute(params![
                    reg.id.as_str(),
                    reg.person_id.as_str(),
                    format_calendar_date(reg.date),
                    reg.session.as_str(),
                    reg.note.as_deref(),
                    position as i64,
                ])?;
            }
            tx.execute(
                "UPDATE schedule_state SET version = version + 1 WHERE singleton = 1;",
                [],
            )?;
            Ok(())
        })();

        if let Err(err) = result {
            error!(
                "event=registrations_save module=repo status=error backend=sqlite duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
        tx.commit()?;

        let version = expected_version + 1;
        info!(
            "event=registrations_save module=repo status=ok backend=sqlite count={} version={} duration_ms={}",
            registrations.len(),
            version,
            started_at.elapsed().as_millis()
        );
        Ok(version)
    }
}

fn parse_registration_row(row: &Row<'_>) -> RepoResult<Registration> {
    let id: String = row.get("id")?;

    let date_text: String = row.get("work_date")?;
    let date = parse_calendar_date(&date_text).map_err(|err| {
        RepoError::InvalidData(format!("work_registrations.work_date for `{id}`: {err}"))
    })?;

    let session_text: String = row.get("session")?;
    let session = match WorkSession::parse(&session_text) {
        Some(WorkSession::Off) | None => {
            return Err(RepoError::InvalidData(format!(
                "invalid session `{session_text}` in work_registrations.session for `{id}`"
            )));
        }
        Some(session) => session,
    };

    Ok(Registration {
        id,
        person_id: row.get("user_id")?,
        date,
        session,
        note: row.get("note")?,
    })
}

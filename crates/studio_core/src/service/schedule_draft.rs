//! Batch-save editing session over the registration store.
//!
//! # Responsibility
//! - Accumulate toggles on a local working copy.
//! - Report whether the working copy differs from the loaded snapshot.
//! - Persist the working copy once, guarded by the snapshot version.
//!
//! # Invariants
//! - Each toggle applies to the result of the previous toggle, never to the
//!   last persisted snapshot.
//! - A failed commit leaves both the working copy and the base untouched.

use crate::model::person::Actor;
use crate::model::registration::{HalfDay, Registration, SessionStatus, WorkSession};
use crate::repo::registration_repo::{
    RegistrationRepository, RegistrationSnapshot, RepoError, RepoResult,
};
use crate::service::session_registry::{session_status, try_toggle_half_day, ScheduleError};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeMap;

/// Local editing state for one schedule view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    base: RegistrationSnapshot,
    working: Vec<Registration>,
}

impl ScheduleDraft {
    pub fn new(snapshot: RegistrationSnapshot) -> Self {
        Self {
            working: snapshot.registrations.clone(),
            base: snapshot,
        }
    }

    /// Starts a draft from the store's current snapshot.
    pub fn load<R: RegistrationRepository>(repo: &R) -> RepoResult<Self> {
        Ok(Self::new(repo.load()?))
    }

    /// Applies one half-day press to the working copy.
    ///
    /// Returns the cell's new status.
    ///
    /// # Errors
    /// - `ScheduleError::PermissionDenied` when `actor` may not edit
    ///   `person_id`; the working copy is left unchanged.
    pub fn toggle(
        &mut self,
        person_id: &str,
        date: NaiveDate,
        half: HalfDay,
        actor: &Actor,
    ) -> Result<SessionStatus, ScheduleError> {
        self.working = try_toggle_half_day(
            &self.working,
            person_id,
            date,
            half,
            &actor.person_id,
            actor.is_admin,
        )?;
        Ok(session_status(&self.working, person_id, date))
    }

    pub fn working(&self) -> &[Registration] {
        &self.working
    }

    pub fn base_version(&self) -> u64 {
        self.base.version
    }

    /// True iff some `(person, date)` cell differs from the loaded snapshot.
    ///
    /// Record ids and ordering are ignored, so toggling a cell away and back
    /// is not a change.
    pub fn has_changes(&self) -> bool {
        cell_states(&self.working) != cell_states(&self.base.registrations)
    }

    /// Drops local edits and rebases on a fresh snapshot.
    pub fn reset(&mut self, snapshot: RegistrationSnapshot) {
        *self = Self::new(snapshot);
    }

    /// Saves the working copy against the base version.
    ///
    /// # Errors
    /// - `RepoError::StaleWrite` when another writer saved first; call
    ///   `reset` with a fresh snapshot and reapply edits.
    pub fn commit<R: RegistrationRepository>(&mut self, repo: &R) -> Result<u64, RepoError> {
        let version = repo.save(&self.working, self.base.version)?;
        info!(
            "event=draft_commit module=draft status=ok from_version={} to_version={} count={}",
            self.base.version,
            version,
            self.working.len()
        );
        self.base = RegistrationSnapshot {
            registrations: self.working.clone(),
            version,
        };
        Ok(version)
    }
}

fn cell_states(registrations: &[Registration]) -> BTreeMap<(&str, NaiveDate), WorkSession> {
    registrations
        .iter()
        .map(|reg| ((reg.person_id.as_str(), reg.date), reg.session))
        .collect()
}
